//! Prometheus metrics and structured logging for the Fuji oracle.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, DEFAULT_LOG_FILTER};
pub use metrics::Metrics;
