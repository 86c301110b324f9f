//! Integer numeric types for prices and quantities
//!
//! All money and quantity arithmetic in the game is exact integer math.
//! `Price` and `Quantity` are thin `u64` newtypes with checked constructors;
//! raw `u64` is used for cash balances and trade values, always mutated
//! through checked operations in the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Price in whole currency units
///
/// Must always be positive. A resting order always carries a concrete price;
/// the synthetic extremes used for market remainders are ordinary `Price`
/// values at the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Create a new Price
    ///
    /// # Panics
    /// Panics if the price is zero
    pub fn new(value: u64) -> Self {
        assert!(value > 0, "Price must be positive");
        Self(value)
    }

    /// Try to create a Price, returning None if invalid
    pub fn try_new(value: u64) -> Option<Self> {
        if value > 0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Get the inner integer value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Trade value for `qty` units at this price
    pub fn notional(&self, qty: Quantity) -> u64 {
        self.0 * qty.as_u64()
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u64::deserialize(deserializer)?;
        Self::try_new(value).ok_or_else(|| serde::de::Error::custom("Price must be positive"))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quantity in whole units of a product
///
/// Order quantities are strictly positive; `zero()` exists only for
/// remaining-quantity bookkeeping on fully filled orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    /// Create a new Quantity
    ///
    /// # Panics
    /// Panics if the quantity is zero
    pub fn new(value: u64) -> Self {
        assert!(value > 0, "Quantity must be positive");
        Self(value)
    }

    /// Try to create a Quantity, returning None if zero
    pub fn try_new(value: u64) -> Option<Self> {
        if value > 0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Zero quantity (fully filled remainder)
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the inner integer value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Check if quantity is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The smaller of two quantities
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Checked subtraction; None if `rhs` exceeds `self`
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Saturating addition
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
