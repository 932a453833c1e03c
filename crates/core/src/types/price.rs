//! Integer price representation.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// A price in the shop currency's minor units.
///
/// Stored as a plain `i64`: SQLite has no decimal type and the catalog only
/// ever carries whole amounts. The currency itself is a deployment concern,
/// not encoded here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(0);

    /// Create a price from an amount in minor units.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Line subtotal: this unit price times a quantity.
    ///
    /// Saturates on overflow; catalog prices and pack counts are nowhere
    /// near `i64::MAX`, so saturation only guards against corrupt input.
    #[must_use]
    pub const fn times(&self, quantity: i64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    /// Formats with thousands separators, e.g. `1,000,000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let first = digits.len() % 3;
        let mut rest = digits.as_str();
        if first > 0 {
            let (head, tail) = digits.split_at(first);
            f.write_str(head)?;
            if !tail.is_empty() {
                f.write_str(",")?;
            }
            rest = tail;
        }
        let mut chunks = rest.as_bytes().chunks(3).peekable();
        while let Some(chunk) = chunks.next() {
            // chunks of a valid ASCII digit string stay valid UTF-8
            f.write_str(core::str::from_utf8(chunk).map_err(|_| fmt::Error)?)?;
            if chunks.peek().is_some() {
                f.write_str(",")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_separators() {
        assert_eq!(Price::new(0).to_string(), "0");
        assert_eq!(Price::new(500).to_string(), "500");
        assert_eq!(Price::new(5000).to_string(), "5,000");
        assert_eq!(Price::new(500_000).to_string(), "500,000");
        assert_eq!(Price::new(1_000_000).to_string(), "1,000,000");
        assert_eq!(Price::new(-42_500).to_string(), "-42,500");
    }

    #[test]
    fn sums_and_multiplies() {
        let total: Price = [Price::new(500_000).times(2), Price::new(250_000)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::new(1_250_000));
    }
}
