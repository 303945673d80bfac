//! Feed error types.

use fuji_core::{Price, Ticker};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Invalid response from {url} ({ticker}): {reason}")]
    InvalidResponse {
        url: String,
        ticker: Ticker,
        reason: String,
    },

    #[error("({feed}) non-positive price {price}")]
    NonPositivePrice { feed: String, price: Price },

    #[error("No price source available")]
    NoSourceAvailable,

    #[error("No price source available for ticker {0}")]
    NoPriceForTicker(Ticker),

    #[error("Feed task failed: {0}")]
    TaskFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeedError {
    /// Whether the caller may retry once quarantined feeds are released.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoSourceAvailable | Self::NoPriceForTicker(_))
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
