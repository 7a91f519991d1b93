//! Monetary amounts.
//!
//! Costs are exact base-10 decimals (`rust_decimal::Decimal`, 28 significant
//! digits). Binary floating point never touches a cost: `0.1 + 0.2` is `0.3`
//! here, and summing a thousand layers gives the same answer in any order.
//!
//! There are no operator impls: every sum or difference is checked and the
//! caller decides what leaving the decimal range means.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// A monetary value in the (single, implicit) inventory currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub const fn from_decimal(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Amount expressed in hundredths (`from_cents(1099)` is `10.99`).
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    pub const fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// `self × quantity`, or `None` if the result leaves the decimal range.
    pub fn checked_times(self, quantity: u64) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Sum of `amounts`, or `None` as soon as a partial sum overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.checked_add(m))
    }

    /// Cost per unit when `self` is spread over `quantity` units.
    ///
    /// Zero units yield zero, never an error.
    pub fn per_unit(self, quantity: u64) -> Money {
        if quantity == 0 {
            return Money::ZERO;
        }
        Money(self.0 / Decimal::from(quantity))
    }

    /// Round to `scale` decimal places, midpoints away from zero.
    pub fn round_to(self, scale: u32) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Money)
            .map_err(|e| DomainError::invalid_operation(format!("invalid amount {s:?}: {e}")))
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_sums_are_exact() {
        let total = Money::checked_sum([dec!(0.1), dec!(0.2)].into_iter().map(Money::from));
        assert_eq!(total, Some(Money::from_decimal(dec!(0.3))));
    }

    #[test]
    fn checked_sum_reports_overflow() {
        let huge = Money::from_decimal(Decimal::MAX);
        assert_eq!(Money::checked_sum([huge, Money::from_cents(100)]), None);
        assert_eq!(Money::checked_sum(core::iter::empty()), Some(Money::ZERO));
        assert_eq!(
            Money::from_cents(500).checked_sub(Money::from_cents(125)),
            Some(Money::from_cents(375))
        );
    }

    #[test]
    fn per_unit_of_zero_quantity_is_zero() {
        assert_eq!(Money::from_cents(2000).per_unit(0), Money::ZERO);
    }

    #[test]
    fn per_unit_keeps_fractional_cents() {
        let avg = Money::from_cents(3500).per_unit(15);
        assert_eq!(avg.round_to(3), Money::from_decimal(dec!(2.333)));
        assert_eq!(avg.round_to(2), Money::from_cents(233));
    }

    #[test]
    fn round_to_breaks_midpoints_away_from_zero() {
        assert_eq!(
            Money::from_decimal(dec!(2.345)).round_to(2),
            Money::from_decimal(dec!(2.35))
        );
    }

    #[test]
    fn checked_times_detects_overflow() {
        let huge = Money::from_decimal(Decimal::MAX);
        assert_eq!(huge.checked_times(2), None);
        assert_eq!(
            Money::from_cents(300).checked_times(5),
            Some(Money::from_cents(1500))
        );
    }

    #[test]
    fn parses_and_serializes_as_decimal_string() {
        let m: Money = "12.50".parse().unwrap();
        assert_eq!(m, Money::from_cents(1250));
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"12.50\"");
        assert!("twelve".parse::<Money>().is_err());
    }

    #[test]
    fn zero_is_not_negative() {
        assert!(!Money::ZERO.is_negative());
        assert!(Money::from_cents(-1).is_negative());
    }
}
