//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Key error: {0}")]
    Key(#[from] fuji_attest::KeyError),

    #[error("Feed error: {0}")]
    Feed(#[from] fuji_feed::FeedError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] fuji_oracle::OracleError),

    #[error("Server error: {0}")]
    Server(#[from] fuji_server::ServerError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] fuji_telemetry::TelemetryError),
}

pub type AppResult<T> = Result<T, AppError>;
