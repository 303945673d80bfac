//! Core domain types for the Fuji price oracle.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `Ticker`: closed registry of attestable trading pairs
//! - `Price`: precision-safe decimal price
//! - `SafeInteger`: integers that survive the attestation encoding unchanged
//! - `AssetIdMode`, `TimestampUnit`: per-deployment attestation settings
//! - `Clock`: injectable time source

pub mod asset;
pub mod clock;
pub mod decimal;
pub mod error;
pub mod safe_int;
pub mod ticker;

pub use asset::{AssetIdMode, TimestampUnit};
pub use clock::{Clock, ManualClock, SystemClock};
pub use decimal::Price;
pub use error::{CoreError, Result};
pub use safe_int::{SafeInteger, SafeIntegerError, MAX_SAFE_INTEGER};
pub use ticker::Ticker;
