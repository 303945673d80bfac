//! Oracle configuration.

use fuji_core::{AssetIdMode, Ticker, TimestampUnit};
use serde::{Deserialize, Serialize};

/// Which tickers are attested and how the message is shaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Tickers the oracle is willing to attest.
    #[serde(default = "default_tickers")]
    pub tickers: Vec<Ticker>,

    /// Honour caller-supplied `{timestamp, price}` instead of live prices.
    /// Development only.
    #[serde(default)]
    pub development_override: bool,

    #[serde(default)]
    pub timestamp_unit: TimestampUnit,

    #[serde(default)]
    pub asset_id: AssetIdMode,
}

fn default_tickers() -> Vec<Ticker> {
    vec![Ticker::BtcUsd]
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            development_override: false,
            timestamp_unit: TimestampUnit::default(),
            asset_id: AssetIdMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: OracleConfig = toml::from_str("").unwrap();
        assert_eq!(config, OracleConfig::default());
        assert_eq!(config.tickers, vec![Ticker::BtcUsd]);
        assert_eq!(config.timestamp_unit, TimestampUnit::Milliseconds);
    }

    #[test]
    fn test_full_toml() {
        let config: OracleConfig = toml::from_str(
            r#"
            tickers = ["BTCUSD", "ETHUSD"]
            development_override = true
            timestamp_unit = "seconds"

            [asset_id]
            mode = "currency_code"
            "#,
        )
        .unwrap();
        assert_eq!(config.tickers, vec![Ticker::BtcUsd, Ticker::EthUsd]);
        assert!(config.development_override);
        assert_eq!(config.timestamp_unit, TimestampUnit::Seconds);
    }

    #[test]
    fn test_unknown_ticker_rejected() {
        assert!(toml::from_str::<OracleConfig>(r#"tickers = ["DOGEUSD"]"#).is_err());
    }
}
