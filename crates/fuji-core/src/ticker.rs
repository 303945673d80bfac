//! Attestable trading pairs.
//!
//! The set of tickers is closed: a symbol that does not parse into a
//! [`Ticker`] can never be attested, regardless of configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Trading pair identifier (base asset quoted in a fiat currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ticker {
    #[serde(rename = "BTCUSD")]
    BtcUsd,
    #[serde(rename = "ETHUSD")]
    EthUsd,
}

impl Ticker {
    /// Every ticker known to the oracle.
    pub const ALL: [Ticker; 2] = [Ticker::BtcUsd, Ticker::EthUsd];

    /// Upper-case pair symbol, e.g. `BTCUSD`.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::BtcUsd => "BTCUSD",
            Self::EthUsd => "ETHUSD",
        }
    }

    /// Base asset symbol, e.g. `BTC`.
    pub fn base(&self) -> &'static str {
        match self {
            Self::BtcUsd => "BTC",
            Self::EthUsd => "ETH",
        }
    }

    /// ISO 4217 code of the quote currency, e.g. `USD`.
    pub fn quote_currency(&self) -> &'static str {
        match self {
            Self::BtcUsd | Self::EthUsd => "USD",
        }
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Ticker {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.symbol() == s)
            .ok_or_else(|| CoreError::UnknownTicker(s.to_string()))
    }
}
