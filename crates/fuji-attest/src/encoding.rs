//! Canonical attestation message.
//!
//! Layout, no padding and no length prefix:
//!
//! | Offset | Size | Field                     |
//! |--------|------|---------------------------|
//! | 0      | 8    | timestamp, u64 LE         |
//! | 8      | 8    | price, u64 LE             |
//! | 16     | n    | asset id bytes (verbatim) |

use fuji_core::{SafeInteger, SafeIntegerError};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of the fixed `timestamp || price` prefix.
pub const PREFIX_LEN: usize = 16;

/// A numeric field could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("{field}: negative value {value} cannot be encoded")]
    Negative { field: &'static str, value: String },

    #[error("{field}: value {value} exceeds 2^53 - 1")]
    OutOfRange { field: &'static str, value: String },

    #[error("{field}: value {value} is not an integer")]
    Fractional { field: &'static str, value: String },
}

impl EncodingError {
    fn from_safe_int(field: &'static str, err: SafeIntegerError) -> Self {
        match err {
            SafeIntegerError::Negative(value) => Self::Negative { field, value },
            SafeIntegerError::OutOfRange(value) => Self::OutOfRange { field, value },
            SafeIntegerError::Fractional(value) => Self::Fractional { field, value },
        }
    }

    /// Name of the offending field (`timestamp` or `price`).
    pub fn field(&self) -> &'static str {
        match self {
            Self::Negative { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::Fractional { field, .. } => field,
        }
    }
}

/// Encoded `timestamp || price || asset_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationMessage {
    timestamp: SafeInteger,
    price: SafeInteger,
    bytes: Vec<u8>,
}

impl AttestationMessage {
    /// Validate both numbers, then encode.
    ///
    /// Timestamp is checked before price, so a request with two bad values
    /// reports the timestamp.
    pub fn encode(
        timestamp: Decimal,
        price: Decimal,
        asset_id: &[u8],
    ) -> Result<Self, EncodingError> {
        let timestamp = SafeInteger::try_from(timestamp)
            .map_err(|e| EncodingError::from_safe_int("timestamp", e))?;
        let price =
            SafeInteger::try_from(price).map_err(|e| EncodingError::from_safe_int("price", e))?;

        let mut bytes = Vec::with_capacity(PREFIX_LEN + asset_id.len());
        bytes.extend_from_slice(&timestamp.to_le_bytes());
        bytes.extend_from_slice(&price.to_le_bytes());
        bytes.extend_from_slice(asset_id);

        Ok(Self {
            timestamp,
            price,
            bytes,
        })
    }

    pub fn timestamp(&self) -> SafeInteger {
        self.timestamp
    }

    pub fn price(&self) -> SafeInteger {
        self.price
    }

    pub fn asset_id(&self) -> &[u8] {
        &self.bytes[PREFIX_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Single SHA-256 pass over the message.
    pub fn hash(&self) -> [u8; 32] {
        Sha256::digest(&self.bytes).into()
    }
}
