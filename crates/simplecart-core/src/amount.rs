//! # Amount Module
//!
//! Provides the `Amount` type used for attribute totals.
//!
//! ## Why Fixed-Point?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Attribute values arrive as strings: price = "349.00", weight = "0.2"  │
//! │                                                                         │
//! │  As f64:   3 × 0.1 = 0.30000000000000004  ❌                            │
//! │                                                                         │
//! │  OUR SOLUTION: Ten-thousandths in an i64                                │
//! │    "0.1"    → 1000 units     3 × 1000 = 3000 → "0.30"                  │
//! │    "349.00" → 3490000 units  5 × 3490000 → "1745.00"                   │
//! │                                                                         │
//! │  Digits past the fourth decimal place are Bankers-rounded on parse.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use simplecart_core::amount::Amount;
//!
//! let price = Amount::parse("349.00").unwrap();
//! let line = price * 5;
//! assert_eq!(line.to_string(), "1745.00");
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// Units per whole number (four decimal places).
pub const SCALE: i64 = 10_000;

const KEPT_DECIMALS: usize = 4;

// =============================================================================
// Amount Type
// =============================================================================

/// A decimal value stored as ten-thousandths.
///
/// ## Design Decisions
/// - **i64 (signed)**: attribute values may be negative (discount lines)
/// - **Saturating arithmetic**: a hostile attribute value cannot panic a total
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    /// Creates an amount from raw ten-thousandths.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Amount(units)
    }

    /// Creates an amount from a whole number.
    #[inline]
    pub const fn from_integer(value: i64) -> Self {
        Amount(value.saturating_mul(SCALE))
    }

    /// Returns the value in ten-thousandths.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero.
    #[inline]
    pub const fn zero() -> Self {
        Amount(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Lossy conversion for display layers that want a float.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Parses a plain decimal string (`"12"`, `"-0.5"`, `"349.00"`).
    ///
    /// Returns `None` for anything else: empty strings, exponents, thousands
    /// separators, trailing garbage. Surrounding whitespace is ignored.
    ///
    /// ## Example
    /// ```rust
    /// use simplecart_core::amount::Amount;
    ///
    /// assert_eq!(Amount::parse("1.5").unwrap().units(), 15_000);
    /// assert_eq!(Amount::parse(".25").unwrap().units(), 2_500);
    /// assert!(Amount::parse("12abc").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Amount> {
        let trimmed = raw.trim();
        let (negative, digits) = match trimmed.as_bytes().first()? {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().unwrap_or(i64::MAX) };

        let frac = frac.as_bytes();
        let mut units: i64 = 0;
        for position in 0..KEPT_DECIMALS {
            let digit = frac.get(position).map_or(0, |b| i64::from(b - b'0'));
            units = units * 10 + digit;
        }

        // Bankers rounding on whatever lies past the kept decimals
        if let Some((&first, tail)) = frac.get(KEPT_DECIMALS..).and_then(|rest| rest.split_first())
        {
            let round_up = match first.cmp(&b'5') {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => tail.iter().any(|&b| b != b'0') || units % 2 == 1,
            };
            if round_up {
                units += 1;
            }
        }

        // Digits were checked above, so overflow is the only failure left
        let total = whole.saturating_mul(SCALE).saturating_add(units);
        Some(Amount(if negative { -total } else { total }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows at least two decimals and at most four, trailing zeros trimmed.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE as u64;
        let frac = format!("{:04}", abs % scale);
        let frac = frac.trim_end_matches('0');
        write!(f, "{}{}.{:0<2}", sign, abs / scale, frac)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::zero()
    }
}

impl Add for Amount {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Amount(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Amount {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

/// Multiplication by a cart quantity.
impl Mul<u32> for Amount {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Amount(self.0.saturating_mul(i64::from(qty)))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, a| acc + a)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
