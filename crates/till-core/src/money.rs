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
//! │    3 × 10.00 × (1 - 10/100) = 27.000000000000004  ❌ WRONG!             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    3 × 1000 cents = 3000, discount 1000 bps = 300 → 2700 cents         │
//! │    Every rounding step is explicit (half up, to the cent)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line = price.checked_mul(2).unwrap(); // $21.98
//! assert_eq!(line.to_string(), "$21.98");
//! assert_eq!(Money::from_cents(i64::MAX).checked_mul(2), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::types::{Discount, TaxRate};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: Subtraction of discounts never wraps
/// - **Saturating `+`**: sums clamp at `i64::MAX` instead of wrapping
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **No float constructor**: decimal text goes through [`crate::parse`]
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► SaleLine.unit_price ──► SaleLine.line_total
///                                                 │
///                    FinalizedSale.subtotal ◄─────┘
///                            │
///                            ├──► tax (per sale rate) ──► total
///                            │
///                            └──► CloseSummary.base_total / tax_total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount, rounded half up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(2700); // $27.00
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(2100)); // 21%
    /// assert_eq!(tax.cents(), 567);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money::from_cents(scale_bps(self.0, rate.bps()))
    }

    /// Multiplies money by a quantity, `None` if the result does not fit.
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, `None` if the result does not fit.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::Discount;
    ///
    /// let gross = Money::from_cents(3000); // $30.00
    /// let net = gross.apply_discount(Discount::from_bps(1000)); // 10% off
    /// assert_eq!(net.cents(), 2700);
    /// ```
    pub fn apply_discount(&self, discount: Discount) -> Money {
        Money::from_cents(self.0 - scale_bps(self.0, discount.bps()))
    }

    /// Returns the value in major units as a float.
    ///
    /// ## Note
    /// Only for serializing to formats that expect a JSON number.
    /// Never feed the result back into arithmetic.
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    fn major_abs(&self) -> u64 {
        (self.0 / 100).unsigned_abs()
    }

    fn minor_abs(&self) -> u64 {
        (self.0 % 100).unsigned_abs()
    }
}

/// `amount * bps / 10000`, rounded half away from zero.
fn scale_bps(amount: i64, bps: u32) -> i64 {
    // i128 so large tickets cannot overflow
    let product = amount as i128 * bps as i128;
    let rounded = if product < 0 {
        (product - 5000) / 10000
    } else {
        (product + 5000) / 10000
    };
    rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Receipt-style display: `$1,234.56`, `-$5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            group_thousands(self.major_abs()),
            self.minor_abs()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
