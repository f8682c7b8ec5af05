//! Shared value types.

use std::ops::Add;

use error_stack::report;
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, ParsingError};

/// A monetary amount in major denomination units (e.g. dollars, not cents),
/// as used on the gateway wire.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MajorUnit(f64);

impl MajorUnit {
    /// Wraps the given amount.
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// A zero amount.
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// The inner floating point value.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }

    /// Parses a buyer-entered amount string.
    pub fn parse(input: &str) -> CustomResult<Self, ParsingError> {
        let value = input
            .trim()
            .parse::<f64>()
            .map_err(|_| report!(ParsingError::FloatParsingError("amount")))?;
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(report!(ParsingError::FloatParsingError("amount")))
        }
    }

    /// Formats the amount the way gateways expect it: two decimal places.
    pub fn to_wire(self) -> String {
        format!("{:.2}", self.0)
    }
}

impl Add for MajorUnit {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::fmt::Display for MajorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_amounts() {
        let amount = MajorUnit::parse(" 12.5 ").unwrap();
        assert_eq!(amount.to_wire(), "12.50");
        assert!(amount.is_positive());
    }

    #[test]
    fn rejects_non_numeric_amounts() {
        assert!(MajorUnit::parse("12,50").is_err());
        assert!(MajorUnit::parse("abc").is_err());
        assert!(MajorUnit::parse("").is_err());
    }

    #[test]
    fn rejects_non_finite_amounts() {
        assert!(MajorUnit::parse("inf").is_err());
        assert!(MajorUnit::parse("NaN").is_err());
    }
}
