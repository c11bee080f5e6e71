//! Type-safe price representation using decimal arithmetic.
//!
//! All catalog and order amounts are Indian rupees. They are stored and sent
//! over the wire as plain JSON numbers, and kept as [`Decimal`] in memory so
//! that line totals and tax never pick up binary floating point error.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount in rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal rupee amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Multiply by a rate and round to whole rupees, halves away from zero.
    #[must_use]
    pub fn percent_rounded(self, rate: Decimal) -> Self {
        Self((self.0 * rate).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Amount in paise (1/100 rupee), as expected by the payment gateway.
    ///
    /// Returns `None` if the amount does not fit in a `u64` (negative or huge).
    #[must_use]
    pub fn to_paise(self) -> Option<u64> {
        (self.0 * Decimal::ONE_HUNDRED).round().to_u64()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0.normalize())
    }
}
