//! Oracle facade.
//!
//! Composes the ticker registry, the price [`Aggregator`](fuji_feed::Aggregator)
//! and the [`AttestationBuilder`](fuji_attest::AttestationBuilder) into a
//! single `attest(ticker)` entry point.

pub mod config;
pub mod dto;
pub mod error;
pub mod oracle;

pub use config::OracleConfig;
pub use dto::{AttestationProof, OracleAttestation, OracleInfo};
pub use error::{OracleError, OracleResult};
pub use oracle::{AttestOverride, Oracle};
