use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Fixed-point decimal used for prices, quantities and totals.
///
/// Totals are always produced through [`Amount::round_cents`], which rounds
/// half-up (midpoint away from zero) and pins the scale to two digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE: Self = Self(Decimal::ONE);

    /// Builds an amount from minor units, e.g. `from_cents(1250)` is `12.50`.
    #[cfg(test)]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parses form input.
    ///
    /// Blank input is missing (`None`). Anything else that is not a number
    /// counts as zero, so a half-filled row still has a usable total.
    pub fn parse_lenient(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        match Decimal::from_str(trimmed) {
            Ok(value) => Some(Self(value)),
            Err(_) => {
                warn!(input = %trimmed, "Non-numeric amount treated as zero");
                Some(Self::ZERO)
            }
        }
    }

    /// Rounds to cents, half-up, with a fixed scale of two.
    pub fn round_cents(self) -> Self {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        Self(rounded)
    }

    pub fn saturating_mul(self, other: Self) -> Self {
        Self(self.0.saturating_mul(other.0))
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or a decimal string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Ok(Amount::parse_lenient(v).unwrap_or(Amount::ZERO))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        match Decimal::from_f64(v) {
            Some(value) => Ok(Amount(value)),
            None => {
                warn!(value = v, "Non-finite amount treated as zero");
                Ok(Amount::ZERO)
            }
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_missing() {
        assert_eq!(Amount::parse_lenient(""), None);
        assert_eq!(Amount::parse_lenient("   "), None);
    }

    #[test]
    fn garbage_input_is_zero() {
        assert_eq!(Amount::parse_lenient("abc"), Some(Amount::ZERO));
        assert_eq!(Amount::parse_lenient("12abc"), Some(Amount::ZERO));
    }

    #[test]
    fn numeric_input_parses_exactly() {
        assert_eq!(Amount::parse_lenient(" 12.50 "), Some(Amount::from_cents(1250)));
    }

    #[test]
    fn round_cents_is_half_up_with_two_digits() {
        let third: Amount = "0.125".parse().unwrap();
        assert_eq!(third.round_cents().to_string(), "0.13");

        let negative: Amount = "-0.125".parse().unwrap();
        assert_eq!(negative.round_cents().to_string(), "-0.13");

        assert_eq!(Amount::from(30).round_cents().to_string(), "30.00");
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Amount::from_cents(1999)).unwrap();
        assert_eq!(json, "\"19.99\"");
    }

    #[test]
    fn deserializes_strings_and_numbers() {
        let from_str: Amount = serde_json::from_str("\"7.25\"").unwrap();
        let from_int: Amount = serde_json::from_str("3").unwrap();
        let from_float: Amount = serde_json::from_str("12.5").unwrap();
        let from_garbage: Amount = serde_json::from_str("\"n/a\"").unwrap();

        assert_eq!(from_str, Amount::from_cents(725));
        assert_eq!(from_int, Amount::from(3));
        assert_eq!(from_float, Amount::from_cents(1250));
        assert_eq!(from_garbage, Amount::ZERO);
    }
}
