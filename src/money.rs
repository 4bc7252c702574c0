//! Fixed-point money with exactly two decimal places.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// An amount of money, stored as a whole number of cents.
///
/// Values built from a [Decimal] are rounded to two decimal places with
/// banker's rounding, so `10.005` becomes `10.00` and `10.015` becomes
/// `10.02`. A single amount has at most 16 integer digits, like a
/// `DECIMAL(18, 2)` column. Sums of [Money] are exact and overflow is
/// reported as [Error::AmountOutOfRange] through [Money::checked_add].
///
/// In JSON, money is a number, e.g. `25.5`. In SQLite it is an `INTEGER`
/// column holding cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Zero dollars and zero cents.
    pub const ZERO: Money = Money { cents: 0 };

    /// Create an amount from a whole number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// The amount as a whole number of cents.
    pub const fn cents(&self) -> i64 {
        self.cents
    }

    /// The amount as a decimal with a scale of exactly two.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.cents, 2)
    }

    /// Add two amounts.
    ///
    /// # Errors
    /// Returns [Error::AmountOutOfRange] if the sum does not fit in 64 bits
    /// worth of cents.
    pub fn checked_add(self, rhs: Money) -> Result<Money, Error> {
        self.cents
            .checked_add(rhs.cents)
            .map(Money::from_cents)
            .ok_or_else(|| Error::AmountOutOfRange(format!("{self} + {rhs}")))
    }

    /// Add up `amounts`, starting from zero.
    ///
    /// # Errors
    /// Returns [Error::AmountOutOfRange] as soon as the running total overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Result<Money, Error> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
    }
}

/// Amounts must be strictly smaller than this many cents in magnitude.
const CENTS_LIMIT: u64 = 1_000_000_000_000_000_000;

impl TryFrom<Decimal> for Money {
    type Error = Error;

    /// Round `amount` to two decimal places.
    ///
    /// # Errors
    /// Returns [Error::AmountOutOfRange] if the amount has more than 16
    /// integer digits.
    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .filter(|cents| cents.unsigned_abs() < CENTS_LIMIT)
            .map(Money::from_cents)
            .ok_or_else(|| Error::AmountOutOfRange(amount.to_string()))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_decimal().fmt(f)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;

        Money::try_from(amount).map_err(serde::de::Error::custom)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.cents))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Money::from_cents)
    }
}
