//! HTTP surface of the Fuji oracle.
//!
//! ```text
//! GET /ping              -> {"message":"pong"}
//! GET /oracle            -> OracleInfo
//! GET /oracle/{ticker}   -> OracleAttestation
//! GET /metrics           -> Prometheus text exposition
//! ```

mod config;
mod error;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{create_router, run_server, shutdown_signal, AppState};
