//! Fuji price oracle - Entry Point

use anyhow::Result;
use clap::Parser;
use fuji_app::{AppConfig, Application, CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH};
use tracing::info;

/// Signed BTC/ETH price attestations from aggregated exchange feeds
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via FUJI_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config path: CLI arg > FUJI_CONFIG env var > default
    let config_path = args.config.or_else(|| std::env::var(CONFIG_ENV_VAR).ok());
    let config = AppConfig::load(config_path.as_deref())?;

    fuji_telemetry::init_logging(&config.telemetry.log_level)?;

    info!("Starting Fuji oracle v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_path = config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH),
        port = config.server.port,
        "Configuration loaded"
    );

    let app = Application::new(config)?;
    app.run().await?;

    info!("Shutdown complete");
    Ok(())
}
