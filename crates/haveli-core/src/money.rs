//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! Rupee amounts are stored as integer paise (1 Rs. = 100 paise). Floating
//! point cannot represent two-decimal currency exactly (`0.1 + 0.2 !=
//! 0.3`), and bill totals must satisfy `total == Σ quantity × price` with no
//! rounding drift. Integer arithmetic makes that identity exact. Only display
//! formatting converts back to rupees.
//!
//! ## Usage
//! ```rust
//! use haveli_core::money::Money;
//!
//! let price = Money::from_paise(5000); // Rs. 50.00
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.paise(), 15000); // Rs. 150.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (the smallest currency unit).
///
/// - **i64 (signed)**: allows negative values for refunds and corrections
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ```rust
    /// use haveli_core::money::Money;
    ///
    /// let price = Money::from_paise(10050); // Rs. 100.50
    /// assert_eq!(price.paise(), 10050);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees and paise.
    ///
    /// For negative amounts only the rupee part should be negative:
    /// `from_rupees(-5, 50)` is Rs. -5.50.
    #[inline]
    pub const fn from_rupees(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
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

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use haveli_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(4500); // Rs. 45.00
    /// assert_eq!(unit_price.multiply_quantity(3).paise(), 13500);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Calculates tax at a rate given in basis points (1 bps = 0.01%).
    ///
    /// Uses integer math with half-up rounding: `(paise * bps + 5000) / 10000`.
    /// i128 intermediate prevents overflow on large amounts.
    pub fn calculate_tax(&self, rate_bps: u32) -> Money {
        let tax_paise = (self.0 as i128 * rate_bps as i128 + 5000) / 10000;
        Money::from_paise(tax_paise as i64)
    }

    /// Formats the rupee amount with comma grouping: `12345.50` → `"12,345.50"`.
    ///
    /// Matches the invoice and WhatsApp message formatting of the receipts
    /// (`Rs. 1,150.00`).
    pub fn format_grouped(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let rupees = self.rupees().abs();
        let digits = rupees.to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!("{}{}.{:02}", sign, grouped, self.paise_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount with the currency label used on receipts.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rs. {}", self.format_grouped())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
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
        let money = Money::from_paise(10050);
        assert_eq!(money.paise(), 10050);
        assert_eq!(money.rupees(), 100);
        assert_eq!(money.paise_part(), 50);
    }

    #[test]
    fn test_from_rupees() {
        assert_eq!(Money::from_rupees(100, 50).paise(), 10050);
        assert_eq!(Money::from_rupees(-5, 50).paise(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(10050)), "Rs. 100.50");
        assert_eq!(format!("{}", Money::from_paise(500)), "Rs. 5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "Rs. -5.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "Rs. 0.00");
    }

    #[test]
    fn test_grouped_formatting() {
        assert_eq!(Money::from_paise(115000).format_grouped(), "1,150.00");
        assert_eq!(Money::from_paise(123456750).format_grouped(), "1,234,567.50");
        assert_eq!(Money::from_paise(99900).format_grouped(), "999.00");
        assert_eq!(Money::from_paise(-115000).format_grouped(), "-1,150.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!(a.multiply_quantity(3).paise(), 3000);
    }

    #[test]
    fn test_line_total_exact_for_two_decimal_inputs() {
        // Rs. 50.00 × 3 = Rs. 150.00, no drift
        let unit = Money::from_rupees(50, 0);
        assert_eq!(unit.multiply_quantity(3), Money::from_rupees(150, 0));
    }

    #[test]
    fn test_calculate_tax() {
        // Rs. 100.00 at 18% GST = Rs. 18.00
        let amount = Money::from_paise(10000);
        assert_eq!(amount.calculate_tax(1800).paise(), 1800);

        // Rs. 10.00 at 8.25% = Rs. 0.825 → 83 paise (half-up)
        assert_eq!(Money::from_paise(1000).calculate_tax(825).paise(), 83);
    }
}
