use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const DEFAULT_CURRENCY_CODE: &str = "USD";

//--------------------------------------       Money         ---------------------------------------------------------
/// A monetary amount, stored as an integer number of cents.
///
/// Fractional cents only ever appear in intermediate decimal calculations (e.g. applying a tax rate) and are rounded
/// half away from zero when converted back with [`Money::from_decimal`].
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| MoneyConversionError(format!("{s}: {e}")))?;
        Self::from_decimal(value)
    }
}

impl Money {
    /// The amount in cents
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Creates a value from whole currency units, e.g. `Money::from_units(100)` is 100.00
    pub fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Converts a decimal currency amount into cents, rounding half away from zero.
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyConversionError> {
        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| MoneyConversionError(format!("{value} is too large")))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        cents.to_i64().map(Self).ok_or_else(|| MoneyConversionError(format!("{value} is out of range")))
    }

    /// Multiplies this amount by `rate`, rounding the result to the nearest cent.
    pub fn apply_rate(&self, rate: Decimal) -> Result<Self, MoneyConversionError> {
        let product = self
            .to_decimal()
            .checked_mul(rate)
            .ok_or_else(|| MoneyConversionError(format!("{self} * {rate} overflows")))?;
        Self::from_decimal(product)
    }
}
