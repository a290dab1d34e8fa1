use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// A currency-agnostic amount held at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Money::from_decimal)
    }
}

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Whole cents, or `None` when the amount does not fit in an `i64`.
    pub fn to_cents(self) -> Option<i64> {
        self.0.checked_mul(Decimal::ONE_HUNDRED)?.round().to_i64()
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cents_roundtrip() {
        assert_eq!(Money::from_cents(12345).to_cents(), Some(12345));
        assert_eq!(Money::from_cents(-5).to_cents(), Some(-5));
    }

    #[test]
    fn huge_amounts_have_no_cents() {
        assert_eq!(Money::from_decimal(Decimal::MAX).to_cents(), None);
        assert_eq!(Money::from_decimal(dec!(100000000000000000)).to_cents(), None);
        assert_eq!(Money::from_cents(i64::MAX).to_cents(), Some(i64::MAX));
    }

    #[test]
    fn from_decimal_rounds_to_two_places() {
        assert_eq!(Money::from_decimal(dec!(3.14159)), Money::from_cents(314));
    }

    #[test]
    fn display_has_two_decimals() {
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_decimal(dec!(99)).to_string(), "99.00");
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = [150, 250, 100].into_iter().map(Money::from_cents).sum();
        assert_eq!(total, Money::from_cents(500));
    }

    #[test]
    fn serializes_as_number() {
        let json = serde_json::to_string(&Money::from_cents(1250)).unwrap();
        assert_eq!(json, "12.5");
        let back: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(back, Money::from_cents(1250));
    }

    #[test]
    fn deserializing_rounds_to_two_places() {
        let money: Money = serde_json::from_str("3.14159").unwrap();
        assert_eq!(money, Money::from_cents(314));
        let money: Money = serde_json::from_str("7e27").unwrap();
        assert_eq!(money.to_cents(), None);
    }
}
