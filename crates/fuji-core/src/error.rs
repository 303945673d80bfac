//! Error types for fuji-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid asset identifier for {ticker}: {reason}")]
    InvalidAssetId { ticker: String, reason: String },

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
