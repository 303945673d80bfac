//! Integers that survive the attestation encoding unchanged.
//!
//! Attested values are consumed by verifiers whose number type is an IEEE-754
//! double, so they are restricted to non-negative integers `<= 2^53 - 1`.
//! Anything else is rejected here, before any byte is written.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Largest integer representable exactly in an IEEE-754 double.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Reasons a value falls outside the safe integer domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SafeIntegerError {
    #[error("negative value {0} cannot be encoded as unsigned")]
    Negative(String),

    #[error("value {0} is out of range (max {MAX_SAFE_INTEGER})")]
    OutOfRange(String),

    #[error("value {0} has a fractional component")]
    Fractional(String),
}

/// Non-negative integer no greater than [`MAX_SAFE_INTEGER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SafeInteger(u64);

impl SafeInteger {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    /// Standard unsigned 64-bit little-endian encoding.
    #[inline]
    pub fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl TryFrom<u64> for SafeInteger {
    type Error = SafeIntegerError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > MAX_SAFE_INTEGER {
            return Err(SafeIntegerError::OutOfRange(value.to_string()));
        }
        Ok(Self(value))
    }
}

impl TryFrom<Decimal> for SafeInteger {
    type Error = SafeIntegerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value < Decimal::ZERO {
            return Err(SafeIntegerError::Negative(value.to_string()));
        }
        if value > Decimal::from(MAX_SAFE_INTEGER) {
            return Err(SafeIntegerError::OutOfRange(value.to_string()));
        }
        if !value.fract().is_zero() {
            return Err(SafeIntegerError::Fractional(value.to_string()));
        }
        value
            .to_u64()
            .map(Self)
            .ok_or_else(|| SafeIntegerError::OutOfRange(value.to_string()))
    }
}

impl fmt::Display for SafeInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
