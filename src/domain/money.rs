use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Number of decimal places every supported currency is settled in.
pub const CURRENCY_PRECISION: u32 = 2;

/// A monetary value held at currency precision (2 decimal places).
///
/// This is a wrapper around `rust_decimal::Decimal`; every constructor rounds
/// half away from zero so that fee arithmetic never carries sub-cent residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        let mut rounded =
            value.round_dp_with_strategy(CURRENCY_PRECISION, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(CURRENCY_PRECISION);
        Self(rounded)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// `self * n`, or `None` if the product is not representable.
    pub fn checked_mul(&self, n: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(n)).map(Self::new)
    }

    /// Returns `percent` percent of this amount, rounded to currency precision.
    pub fn percentage(&self, percent: Decimal) -> Self {
        Self::new(self.0 * percent / Decimal::ONE_HUNDRED)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Saturates at the largest representable amount.
impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}
