//! Fuji price oracle service.
//!
//! Wires configuration, key loading, exchange feeds, the aggregator and the
//! oracle facade into the HTTP server.

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH, PORT_ENV_VAR};
pub use error::{AppError, AppResult};
