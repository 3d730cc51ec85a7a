use crate::error::{FeeError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A monetary value.
///
/// This is a wrapper around `rust_decimal::Decimal` so sums of fees and payments
/// stay exact. The value is signed: pending balances go negative on overpayment.
///
/// Arithmetic is checked. Amounts near the `Decimal` range yield
/// `FeeError::Overflow` instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn checked_add(self, rhs: Money) -> Result<Money> {
        self.0
            .checked_add(rhs.0)
            .map(Money)
            .ok_or_else(|| FeeError::Overflow(format!("{} + {}", self, rhs)))
    }

    pub fn checked_sub(self, rhs: Money) -> Result<Money> {
        self.0
            .checked_sub(rhs.0)
            .map(Money)
            .ok_or_else(|| FeeError::Overflow(format!("{} - {}", self, rhs)))
    }

    /// Adds `rhs` in place, leaving `self` untouched on overflow.
    pub fn try_add_assign(&mut self, rhs: Money) -> Result<()> {
        *self = self.checked_add(rhs)?;
        Ok(())
    }

    pub fn try_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Result<Money> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
    }

    /// `self` as a percentage of `total`, or zero when `total` is not positive.
    pub fn percent_of(&self, total: Money) -> Result<Decimal> {
        if total.0 <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        self.0
            .checked_div(total.0)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| FeeError::Overflow(format!("{} as a percentage of {}", self, total)))
    }

    /// `self / parts`, e.g. a monthly average.
    pub fn split(&self, parts: u32) -> Result<Money> {
        self.0
            .checked_div(Decimal::from(parts))
            .map(Money)
            .ok_or_else(|| FeeError::Overflow(format!("{} / {}", self, parts)))
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
