//! The `attest(ticker)` entry point.
//!
//! Per request: ticker check, then either the caller's override or a live
//! aggregated price, then encode and sign. Nothing is kept between requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use fuji_attest::{Attestation, AttestationBuilder};
use fuji_core::{Clock, SystemClock, Ticker};
use fuji_feed::Aggregator;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::dto::OracleInfo;
use crate::error::{OracleError, OracleResult};

/// Caller-supplied values that bypass the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestOverride {
    pub timestamp: Decimal,
    pub price: Decimal,
}

/// Price oracle facade.
pub struct Oracle {
    config: OracleConfig,
    /// Registered tickers with their resolved asset ids.
    registry: BTreeMap<Ticker, Vec<u8>>,
    aggregator: Arc<Aggregator>,
    builder: AttestationBuilder,
    clock: Arc<dyn Clock>,
}

impl Oracle {
    /// Build the facade, resolving every registered ticker's asset id.
    ///
    /// # Errors
    /// [`OracleError::Config`] if no ticker is registered or a ticker has no
    /// usable asset id.
    pub fn new(
        config: OracleConfig,
        aggregator: Arc<Aggregator>,
        builder: AttestationBuilder,
    ) -> OracleResult<Self> {
        if config.tickers.is_empty() {
            return Err(OracleError::Config("no tickers configured".to_string()));
        }

        let registry = config
            .tickers
            .iter()
            .map(|&ticker| {
                config
                    .asset_id
                    .asset_id(ticker)
                    .map(|id| (ticker, id))
                    .map_err(|e| OracleError::Config(e.to_string()))
            })
            .collect::<OracleResult<BTreeMap<_, _>>>()?;

        if config.development_override {
            warn!("Development override enabled: callers may supply timestamp and price");
        }

        Ok(Self {
            config,
            registry,
            aggregator,
            builder,
            clock: Arc::new(SystemClock),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Public key and attestable tickers.
    pub fn info(&self) -> OracleInfo {
        OracleInfo {
            public_key: hex::encode(self.builder.public_key()),
            available_tickers: self.registry.keys().map(|t| t.to_string()).collect(),
        }
    }

    pub fn aggregator(&self) -> &Arc<Aggregator> {
        &self.aggregator
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Whether a supplied override would be honoured.
    pub fn override_enabled(&self) -> bool {
        self.config.development_override
    }

    /// Signed attestation for `symbol`.
    ///
    /// Returns `Ok(None)` when the symbol is not a registered ticker; no feed
    /// and no signer is touched in that case.
    ///
    /// # Errors
    /// - [`OracleError::Price`] if no feed produced a price.
    /// - [`OracleError::Attest`] if encoding or signing failed.
    pub async fn attest(
        &self,
        symbol: &str,
        override_values: Option<AttestOverride>,
    ) -> OracleResult<Option<Attestation>> {
        let Some((ticker, asset_id)) = symbol
            .parse::<Ticker>()
            .ok()
            .and_then(|t| self.registry.get_key_value(&t))
        else {
            debug!(%symbol, "Ticker not attested");
            return Ok(None);
        };

        let (timestamp, price) = match override_values {
            Some(values) if self.config.development_override => {
                debug!(%ticker, timestamp = %values.timestamp, price = %values.price, "Using override values");
                (values.timestamp, values.price)
            }
            other => {
                if other.is_some() {
                    warn!(%ticker, "Override ignored: development override disabled");
                }
                let price = self.aggregator.get_price(*ticker).await?;
                let now_ms = self.clock.now_ms();
                let timestamp = self.config.timestamp_unit.from_millis(now_ms);
                (Decimal::from(timestamp), price.trunc().inner())
            }
        };

        let attestation = self.builder.build(timestamp, price, asset_id)?;
        debug!(%ticker, timestamp = attestation.timestamp, price = attestation.price, "Attestation produced");
        Ok(Some(attestation))
    }
}

impl std::fmt::Debug for Oracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oracle")
            .field("tickers", &self.registry.keys().collect::<Vec<_>>())
            .field("development_override", &self.config.development_override)
            .field("timestamp_unit", &self.config.timestamp_unit)
            .finish_non_exhaustive()
    }
}
