//! Per-deployment attestation settings.
//!
//! Deployments disagree on two details of the signed message: whether the
//! asset identifier is the quote currency code or an opaque blob, and whether
//! the timestamp counts seconds or milliseconds. Both are fixed at
//! configuration time and never guessed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};
use crate::ticker::Ticker;

/// How the asset identifier suffix of the attestation message is derived.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AssetIdMode {
    /// ASCII bytes of the quote currency code (`BTCUSD` -> `USD`).
    #[default]
    CurrencyCode,
    /// Hex-decoded blob configured per ticker symbol.
    Hex {
        #[serde(default)]
        assets: BTreeMap<String, String>,
    },
}

impl AssetIdMode {
    /// Asset identifier bytes for `ticker`, exactly as they are signed.
    pub fn asset_id(&self, ticker: Ticker) -> Result<Vec<u8>> {
        match self {
            Self::CurrencyCode => Ok(ticker.quote_currency().as_bytes().to_vec()),
            Self::Hex { assets } => {
                let encoded = assets.get(ticker.symbol()).ok_or_else(|| {
                    CoreError::InvalidAssetId {
                        ticker: ticker.to_string(),
                        reason: "no hex asset id configured".to_string(),
                    }
                })?;
                let bytes = hex::decode(encoded.trim().trim_start_matches("0x"))?;
                if bytes.is_empty() {
                    return Err(CoreError::InvalidAssetId {
                        ticker: ticker.to_string(),
                        reason: "hex asset id is empty".to_string(),
                    });
                }
                Ok(bytes)
            }
        }
    }

    /// Check that every ticker in `tickers` resolves to an asset id.
    pub fn validate(&self, tickers: &[Ticker]) -> Result<()> {
        tickers
            .iter()
            .try_for_each(|t| self.asset_id(*t).map(|_| ()))
    }
}

/// Unit of the attested timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampUnit {
    Seconds,
    #[default]
    Milliseconds,
}

impl TimestampUnit {
    /// Convert a Unix millisecond instant to this unit (truncating).
    #[inline]
    pub fn from_millis(&self, ms: u64) -> u64 {
        match self {
            Self::Seconds => ms / 1_000,
            Self::Milliseconds => ms,
        }
    }
}
