//! Money type with exact cent precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts travel as `rust_decimal::Decimal` and are persisted as whole
//! minor units (cents) so that every storage backend sums them exactly.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places of the base currency's minor unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Errors converting a decimal into minor units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The amount has digits below one cent.
    #[error("Amount {0} has sub-cent precision")]
    SubCentPrecision(Decimal),

    /// The amount does not fit in a signed 64-bit count of cents.
    #[error("Amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// A base-currency amount that is guaranteed to be a whole number of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Validates that `amount` is representable in whole cents.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount has sub-cent digits or overflows `i64` cents.
    pub fn try_from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        let scaled = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::OutOfRange(amount))?;
        if !scaled.fract().is_zero() {
            return Err(MoneyError::SubCentPrecision(amount));
        }
        if scaled.trunc().to_i64().is_none() {
            return Err(MoneyError::OutOfRange(amount));
        }
        Ok(Self(amount))
    }

    /// Builds an amount from a count of cents.
    #[must_use]
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, MINOR_UNIT_SCALE))
    }

    /// Returns the amount as a count of cents.
    #[must_use]
    pub fn minor_units(self) -> i64 {
        // try_from_decimal guarantees the value fits
        (self.0 * Decimal::ONE_HUNDRED).trunc().to_i64().unwrap_or_default()
    }

    /// Returns the decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::try_from_decimal(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.round_dp(MINOR_UNIT_SCALE))
    }
}
