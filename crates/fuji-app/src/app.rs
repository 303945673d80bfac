//! Application wiring.

use std::sync::Arc;

use fuji_attest::{AttestationBuilder, KeyManager};
use fuji_feed::{Aggregator, FeedFailure, FeedResult};
use fuji_oracle::Oracle;
use fuji_server::{run_server, shutdown_signal};
use fuji_telemetry::Metrics;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;

/// Main application.
pub struct Application {
    config: AppConfig,
    oracle: Arc<Oracle>,
}

impl Application {
    /// Load the signing key and build every component.
    ///
    /// # Errors
    /// Fails if the private key is missing or invalid, or if the oracle
    /// configuration is inconsistent.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let key_manager = KeyManager::load(&config.key.source()?)?;
        Self::with_key_manager(config, &key_manager)
    }

    /// Build every component around an already loaded key.
    pub fn with_key_manager(config: AppConfig, key_manager: &KeyManager) -> AppResult<Self> {
        let timeout = config.feeds.request_timeout();
        let feeds = config
            .feeds
            .sources
            .iter()
            .map(|source| source.build(timeout))
            .collect::<FeedResult<Vec<_>>>()?;

        let aggregator = Aggregator::builder()
            .feeds(feeds)
            .ban_duration(config.aggregator.ban_duration())
            .on_feed_error(report_feed_failure)
            .build();

        let oracle = Oracle::new(
            config.oracle.clone(),
            Arc::new(aggregator),
            AttestationBuilder::new(key_manager.signer()),
        )?;

        info!(
            public_key = %key_manager.public_key_hex(),
            sources = ?config.feeds.sources,
            tickers = ?config.oracle.tickers,
            "Oracle initialized"
        );

        Ok(Self {
            config,
            oracle: Arc::new(oracle),
        })
    }

    pub fn oracle(&self) -> &Arc<Oracle> {
        &self.oracle
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve until SIGINT or SIGTERM.
    pub async fn run(self) -> AppResult<()> {
        run_server(self.oracle, &self.config.server, shutdown_signal()).await?;
        Ok(())
    }
}

fn report_feed_failure(failure: &FeedFailure) {
    warn!(
        feed = %failure.feed,
        ticker = %failure.ticker,
        error = %failure.error,
        "Price feed failed, quarantined"
    );
    Metrics::feed_failure(&failure.feed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use fuji_attest::KeyError;
    use fuji_core::Ticker;
    use fuji_feed::FeedSource;

    const TEST_PRIVATE_KEY: &str =
        "97abcd30d2cac1c96271711e567ee13ec27ce4360def5f58caea31eb7c926062";

    fn key_manager() -> KeyManager {
        let bytes: Vec<u8> = (0..TEST_PRIVATE_KEY.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&TEST_PRIVATE_KEY[i..i + 2], 16).unwrap())
            .collect();
        KeyManager::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_wires_configured_sources() {
        let mut config = AppConfig::default();
        config.feeds.sources = vec![FeedSource::Kraken, FeedSource::Okx];

        let app = Application::with_key_manager(config, &key_manager()).unwrap();
        let oracle = app.oracle();
        assert_eq!(
            oracle.aggregator().active_feeds(),
            vec!["kraken".to_string(), "okx".to_string()]
        );
        assert_eq!(oracle.info().available_tickers, vec![Ticker::BtcUsd.to_string()]);
        assert_eq!(
            oracle.info().public_key,
            "03f03225c0efa4da141b7ed4b1d2368732719c9430bd329ed8a757fa0022833d3f"
        );
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let mut config = AppConfig::default();
        config.key.env_var = Some("FUJI_TEST_APP_KEY_UNSET".to_string());

        let result = Application::new(config);
        assert!(matches!(
            result,
            Err(AppError::Key(KeyError::EnvVarNotFound(_)))
        ));
    }

    #[test]
    fn test_key_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), format!("0x{TEST_PRIVATE_KEY}\n")).unwrap();

        let mut config = AppConfig::default();
        config.key.file = Some(file.path().to_path_buf());

        let app = Application::new(config).unwrap();
        assert_eq!(app.config().server.port, 8000);
    }
}
