//! Precision-safe decimal price.
//!
//! Exchange feeds report prices as decimal strings. Keeping them in
//! `rust_decimal` avoids binary floating-point drift before the median
//! and truncation steps.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Price with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Drop the fractional part (rounds toward zero).
    #[inline]
    pub fn trunc(&self) -> Self {
        Self(self.0.trunc())
    }

    /// Parse a venue price string, rejecting zero and negative values.
    pub fn parse_positive(s: &str) -> Result<Self, CoreError> {
        let price: Price = s.trim().parse()?;
        if !price.is_positive() {
            return Err(CoreError::InvalidPrice(s.to_string()));
        }
        Ok(price)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}
