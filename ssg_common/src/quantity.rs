use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------     Quantity       ----------------------------------------------------------
/// A whole number of inventory units. Negative values are representable (deltas, corrections), but persisted stock
/// levels are clamped at zero by the storage layer.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Quantity(i64);

op!(binary Quantity, Add, add);
op!(binary Quantity, Sub, sub);
op!(inplace Quantity, SubAssign, sub_assign);
op!(unary Quantity, Neg, neg);

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a stock quantity: {0}")]
pub struct QuantityConversionError(String);

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Quantity {}

impl TryFrom<u64> for Quantity {
    type Error = QuantityConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(QuantityConversionError(format!("Value {} is too large to convert to Quantity", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} pc", self.0)
    }
}

impl Quantity {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Subtraction with a floor of zero. This mirrors the conditional update the stock ledger performs.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self((self.0 - rhs.0).max(0))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Quantity::from(10);
        let b = Quantity::from(4);
        assert_eq!(a + b, Quantity::from(14));
        assert_eq!(a - b, Quantity::from(6));
        assert_eq!(-b, Quantity::from(-4));
        assert_eq!(vec![a, b].into_iter().sum::<Quantity>(), Quantity::from(14));
    }

    #[test]
    fn saturating_sub_floors_at_zero() {
        let a = Quantity::from(3);
        let b = Quantity::from(5);
        assert_eq!(a.saturating_sub(b), Quantity::from(0));
        assert_eq!(b.saturating_sub(a), Quantity::from(2));
    }

    #[test]
    fn conversion_limits() {
        assert!(Quantity::try_from(u64::MAX).is_err());
        assert_eq!(Quantity::try_from(42u64).unwrap(), Quantity::from(42));
    }
}
