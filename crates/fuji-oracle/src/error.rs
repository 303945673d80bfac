//! Oracle error types.

use fuji_attest::AttestError;
use fuji_feed::FeedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Price unavailable: {0}")]
    Price(#[from] FeedError),

    #[error("Attestation failed: {0}")]
    Attest(#[from] AttestError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OracleError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Price(_) => "price",
            Self::Attest(AttestError::Encoding(_)) => "encoding",
            Self::Attest(_) => "signing",
            Self::Config(_) => "config",
        }
    }
}

pub type OracleResult<T> = Result<T, OracleError>;
