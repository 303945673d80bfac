//! Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fuji_attest::KeySource;
use fuji_feed::FeedSource;
use fuji_oracle::OracleConfig;
use fuji_server::ServerConfig;
use fuji_telemetry::DEFAULT_LOG_FILTER;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Config path used when neither `--config` nor [`CONFIG_ENV_VAR`] is set.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "FUJI_CONFIG";

/// Environment variable overriding `server.port`.
pub const PORT_ENV_VAR: &str = "FUJI_PORT";

/// Environment variable holding the oracle private key by default.
pub const DEFAULT_KEY_ENV_VAR: &str = "FUJI_ORACLE_PRIVATE_KEY";

/// Quarantine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// How long a failing feed stays out of the pool.
    #[serde(default = "default_ban_duration_ms")]
    pub ban_duration_ms: u64,
}

fn default_ban_duration_ms() -> u64 {
    60_000
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            ban_duration_ms: default_ban_duration_ms(),
        }
    }
}

impl AggregatorConfig {
    pub fn ban_duration(&self) -> Duration {
        Duration::from_millis(self.ban_duration_ms)
    }
}

/// Exchange feed selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedsConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<FeedSource>,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_sources() -> Vec<FeedSource> {
    FeedSource::ALL.to_vec()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl FeedsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Where the oracle private key comes from. At most one of the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfig {
    #[serde(default)]
    pub env_var: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl KeyConfig {
    pub fn source(&self) -> AppResult<KeySource> {
        match (&self.env_var, &self.file) {
            (Some(_), Some(_)) => Err(AppError::Config(
                "key.env_var and key.file are mutually exclusive".to_string(),
            )),
            (None, Some(path)) => Ok(KeySource::File { path: path.clone() }),
            (Some(var_name), None) => Ok(KeySource::EnvVar {
                var_name: var_name.clone(),
            }),
            (None, None) => Ok(KeySource::EnvVar {
                var_name: DEFAULT_KEY_ENV_VAR.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default tracing filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub key: KeyConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration, apply environment overrides and validate.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// used if present and defaults otherwise.
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH)?,
            None => Self::default(),
        };
        config.apply_port_override(std::env::var(PORT_ENV_VAR).ok().as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config {path}: {e}")))
    }

    /// Replace `server.port` with `value` when set.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> AppResult<()> {
        if let Some(value) = value {
            self.server.port = value
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid {PORT_ENV_VAR} {value:?}: {e}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.feeds.sources.is_empty() {
            return Err(AppError::Config("feeds.sources must not be empty".to_string()));
        }
        if self.feeds.request_timeout_ms == 0 {
            return Err(AppError::Config(
                "feeds.request_timeout_ms must be positive".to_string(),
            ));
        }
        self.oracle
            .asset_id
            .validate(&self.oracle.tickers)
            .map_err(|e| AppError::Config(e.to_string()))?;
        self.key.source()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuji_core::{AssetIdMode, Ticker, TimestampUnit};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.oracle.tickers, vec![Ticker::BtcUsd]);
        assert!(!config.oracle.development_override);
        assert_eq!(config.aggregator.ban_duration(), Duration::from_secs(60));
        assert_eq!(config.feeds.sources.len(), 5);
        assert_eq!(config.feeds.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.telemetry.log_level, "info,fuji=debug");
        assert!(matches!(
            config.key.source().unwrap(),
            KeySource::EnvVar { var_name } if var_name == "FUJI_ORACLE_PRIVATE_KEY"
        ));
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [oracle]
            tickers = ["BTCUSD", "ETHUSD"]
            development_override = true
            timestamp_unit = "seconds"

            [oracle.asset_id]
            mode = "hex"

            [oracle.asset_id.assets]
            BTCUSD = "25b251070e29ca19"
            ETHUSD = "0xdeadbeef"

            [aggregator]
            ban_duration_ms = 3000

            [feeds]
            sources = ["kraken", "coingecko"]
            request_timeout_ms = 2500

            [key]
            file = "/run/secrets/oracle_key"

            [telemetry]
            log_level = "debug"
            "#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.oracle.tickers, vec![Ticker::BtcUsd, Ticker::EthUsd]);
        assert_eq!(config.oracle.timestamp_unit, TimestampUnit::Seconds);
        assert!(matches!(config.oracle.asset_id, AssetIdMode::Hex { .. }));
        assert_eq!(config.aggregator.ban_duration_ms, 3000);
        assert_eq!(
            config.feeds.sources,
            vec![FeedSource::Kraken, FeedSource::Coingecko]
        );
        assert!(matches!(config.key.source().unwrap(), KeySource::File { .. }));
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(matches!(
            AppConfig::from_file("/nonexistent/fuji.toml"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_port_override() {
        let mut config = AppConfig::default();
        config.apply_port_override(Some("8123")).unwrap();
        assert_eq!(config.server.port, 8123);

        config.apply_port_override(None).unwrap();
        assert_eq!(config.server.port, 8123);

        assert!(config.apply_port_override(Some("not-a-port")).is_err());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AppConfig::default();
        config.feeds.sources.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.key.env_var = Some("A".to_string());
        config.key.file = Some(PathBuf::from("/tmp/key"));
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.oracle.asset_id = AssetIdMode::Hex {
            assets: Default::default(),
        };
        assert!(config.validate().is_err());
    }
}
