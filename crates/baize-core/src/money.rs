//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a billing system:                                                   │
//! │    Rp50.000/hour ÷ 60 = 833.333... per minute → Lost rupiah!            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    50000 / 60 = 833 (×60 = 49980)                                       │
//! │    We KNOW we lost 20 rupiah, and handle it explicitly                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use baize_core::money::Money;
//!
//! // Create from minor units (whole rupiah)
//! let rate = Money::from_minor(50_000); // Rp50.000
//!
//! // Arithmetic operations
//! let two_hours = rate * 2;                      // Rp100.000
//! let total = two_hours + Money::from_minor(27_500); // Rp127.500
//!
//! // NEVER do this:
//! // let bad = Money::from_float(50000.0); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (whole rupiah).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds, discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Table.hourly_rate ──► billable units × rate ──► Session.total_cost     │
/// │                                                                         │
/// │  MenuItem.price ──► FnbOrderItem.unit_price ──► FnbOrder.total          │
/// │                                                                         │
/// │  Session + Orders ──► Payment.table_amount / fnb_amount / total_amount  │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (whole rupiah).
    ///
    /// ## Example
    /// ```rust
    /// use baize_core::money::Money;
    ///
    /// let rate = Money::from_minor(50_000); // Rp50.000 per hour
    /// assert_eq!(rate.minor(), 50_000);
    /// ```
    ///
    /// ## Why Minor Units?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and lookups all use minor units.
    /// Only display formatting converts to grouped digits.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units (whole rupiah).
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    ///
    /// ## Example
    /// ```rust
    /// use baize_core::money::Money;
    ///
    /// let zero = Money::zero();
    /// assert_eq!(zero.minor(), 0);
    /// assert!(zero.is_zero());
    /// ```
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax on this amount, rounding half up.
    ///
    /// ## Implementation
    /// We use integer math: `(amount * rate_bps + 5000) / 10000`
    /// The +5000 provides rounding (5000/10000 = 0.5)
    ///
    /// ## Example
    /// ```rust
    /// use baize_core::money::Money;
    /// use baize_core::types::TaxRate;
    ///
    /// let table_cost = Money::from_minor(100_000);
    /// let ppn = TaxRate::from_percentage(11.0); // 11% VAT
    ///
    /// let tax = table_cost.calculate_tax(ppn);
    /// assert_eq!(tax.minor(), 11_000);
    /// ```
    ///
    /// ## Billing Flow
    /// ```text
    /// Table Cost: Rp100.000
    ///      │
    ///      ▼
    /// calculate_tax(11%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Tax: Rp11.000  →  Grand Total: Rp111.000
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // Use i128 to prevent overflow on large amounts
        // rate.bps() is basis points: 1100 = 11%
        // Formula: amount * bps / 10000
        // With rounding: (amount * bps + 5000) / 10000
        let tax_minor = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(tax_minor as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use baize_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(15_000); // Nasi Goreng
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.minor(), 45_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in the local "Rp50.000" format
/// (dot-grouped thousands, no decimal fraction).
///
/// ## Note
/// This is for logs and receipt-adjacent debugging. Frontend formatting
/// owns actual UI display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        write!(f, "{}Rp{}", sign, grouped)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
