//! # Money Module
//!
//! Provides the `Money` type for rental prices and fees.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Prices are entered as decimals ("1500.50") but stored and multiplied  │
//! │  as integer paise (150050). A 3-day booking is exactly 3 × 150050.     │
//! │  No floating point is involved at any step.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use agrirent_core::money::Money;
//!
//! let per_day = Money::parse_decimal("price_per_day", "1500.50").unwrap();
//! assert_eq!(per_day.paise(), 150050);
//!
//! let total = per_day.checked_times(3).unwrap();
//! assert_eq!(total.paise(), 450150);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;

/// Largest accepted amount: ten digits in total with two decimals,
/// i.e. ₹99,999,999.99.
pub const MAX_PAISE: i64 = 9_999_999_999;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 rupee).
///
/// Signed so that arithmetic on fees can never wrap silently; domain rules
/// reject non-positive prices at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use agrirent_core::money::Money;
    ///
    /// let price = Money::from_paise(10050); // ₹100.50
    /// assert_eq!(price.paise(), 10050);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies by a day count, returning `None` on overflow.
    ///
    /// ## User Workflow
    /// ```text
    /// Listing: Tractor ₹100.00/day
    /// Dates: 2024-01-01 → 2024-01-04 (3 days)
    ///      │
    ///      ▼
    /// checked_times(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Booking.total_price: ₹300.00 (frozen at creation)
    /// ```
    #[inline]
    pub const fn checked_times(&self, days: i64) -> Option<Self> {
        match self.0.checked_mul(days) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Parses a decimal rupee amount such as `"1500"`, `"1500.5"` or
    /// `"1500.50"`.
    ///
    /// ## Rules
    /// - Digits with an optional `.` and at most two fractional digits
    /// - No sign, no exponent, no thousands separators
    /// - At most eight integer digits
    ///
    /// ## Example
    /// ```rust
    /// use agrirent_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("price", "100").unwrap().paise(), 10000);
    /// assert_eq!(Money::parse_decimal("price", "99.5").unwrap().paise(), 9950);
    /// assert!(Money::parse_decimal("price", "1.234").is_err());
    /// assert!(Money::parse_decimal("price", "-5").is_err());
    /// ```
    pub fn parse_decimal(field: &str, input: &str) -> Result<Money, ValidationError> {
        let input = input.trim();
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }

        let (whole, frac) = match input.split_once('.') {
            Some((w, f)) => (w, f),
            None => (input, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must be a decimal number like 1500.50"));
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must be a decimal number like 1500.50"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most 2 decimal places"));
        }
        if whole.trim_start_matches('0').len() > 8 {
            return Err(invalid("at most 8 digits before the decimal point"));
        }

        let whole: i64 = whole
            .parse()
            .map_err(|_| invalid("must be a decimal number like 1500.50"))?;
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse::<i64>().unwrap_or(0),
        };

        whole
            .checked_mul(100)
            .and_then(|p| p.checked_add(frac))
            .map(Money)
            .ok_or_else(|| invalid("amount too large"))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Rupee rendering for logs and debugging; the frontend formats for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
        assert_eq!(Money::from_rupees(100).paise(), 10000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(1099)), "₹10.99");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
    }

    #[test]
    fn test_parse_decimal_accepts_common_forms() {
        assert_eq!(Money::parse_decimal("p", "100").unwrap().paise(), 10000);
        assert_eq!(Money::parse_decimal("p", "100.5").unwrap().paise(), 10050);
        assert_eq!(Money::parse_decimal("p", "100.05").unwrap().paise(), 10005);
        assert_eq!(Money::parse_decimal("p", " 7.00 ").unwrap().paise(), 700);
        assert_eq!(Money::parse_decimal("p", "0").unwrap().paise(), 0);
        assert_eq!(
            Money::parse_decimal("p", "99999999.99").unwrap().paise(),
            MAX_PAISE
        );
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(matches!(
            Money::parse_decimal("p", ""),
            Err(ValidationError::Required { .. })
        ));
        for bad in ["abc", "-5", "1.234", ".5", "1e3", "1,000", "123456789"] {
            assert!(
                Money::parse_decimal("p", bad).is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_checked_times() {
        let per_day = Money::from_rupees(100);
        assert_eq!(per_day.checked_times(3), Some(Money::from_rupees(300)));
        assert_eq!(Money::from_paise(i64::MAX).checked_times(2), None);
    }

    #[test]
    fn test_is_positive() {
        assert!(Money::from_paise(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(!Money::from_paise(-100).is_positive());
    }
}
