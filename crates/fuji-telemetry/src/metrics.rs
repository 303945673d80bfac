//! Prometheus metrics for the oracle.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram, register_int_gauge, CounterVec, Encoder, Histogram,
    IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Feed failures reported by the aggregator.
pub static FEED_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "fuji_feed_failures_total",
        "Total price feed failures leading to quarantine",
        &["feed"]
    )
    .unwrap()
});

/// Feeds currently quarantined.
pub static FEED_QUARANTINED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("fuji_feed_quarantined", "Price feeds currently quarantined").unwrap()
});

/// Live attestation latency (aggregation + signing) in milliseconds.
pub static AGGREGATION_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "fuji_aggregation_duration_ms",
        "Live price aggregation and signing latency in milliseconds",
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Attestations produced.
/// Labels: ticker, mode (live/override)
pub static ATTESTATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "fuji_attestations_total",
        "Total signed attestations",
        &["ticker", "mode"]
    )
    .unwrap()
});

/// Failed attestation requests.
/// Labels: kind (price/encoding/signing/config)
pub static ATTESTATION_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "fuji_attestation_errors_total",
        "Total failed attestation requests",
        &["kind"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a feed failure.
    pub fn feed_failure(feed: &str) {
        FEED_FAILURES_TOTAL.with_label_values(&[feed]).inc();
    }

    /// Set the number of quarantined feeds.
    pub fn feeds_quarantined(count: usize) {
        FEED_QUARANTINED.set(count as i64);
    }

    /// Record live attestation latency.
    pub fn aggregation_duration(duration_ms: f64) {
        AGGREGATION_DURATION_MS.observe(duration_ms);
    }

    /// Record a produced attestation.
    pub fn attestation(ticker: &str, mode: &str) {
        ATTESTATIONS_TOTAL.with_label_values(&[ticker, mode]).inc();
    }

    /// Record a failed attestation request.
    pub fn attestation_error(kind: &str) {
        ATTESTATION_ERRORS_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn gather() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
