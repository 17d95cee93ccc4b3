//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    TaxRate      │   │    Discount     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  reference      │   │  bps (u32)      │   │  bps (u32)      │       │
//! │  │  description    │   │  2100 = 21.00%  │   │  0..=10000      │       │
//! │  │  barcode?       │   │  no upper bound │   │  0% to 100%     │       │
//! │  │  price (Money)  │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart, session and receipt types live in their own modules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::money::Money;

/// Renders basis points as a two-decimal percentage (`2100` → `21.00`).
fn fmt_bps(bps: u32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{:02}", bps / 100, bps % 100)
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2100 bps = 21.00% (standard IVA)
///
/// The engine accepts any non-negative rate. The 30% ceiling is a UI
/// convention, see [`crate::validation::validate_ui_tax_rate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    /// 21.00%, the rate a fresh install starts with.
    fn default() -> Self {
        TaxRate(2100)
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_bps(self.0, f)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Per-line percentage discount in basis points, always within 0%..=100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Discount(u32);

impl Discount {
    /// Largest allowed discount: 100%.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a discount, clamping anything above 100%.
    ///
    /// Use [`Discount::try_from_bps`] when out-of-range input must be
    /// reported instead of clamped.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            Discount(Self::MAX_BPS)
        } else {
            Discount(bps)
        }
    }

    /// Creates a discount, rejecting values above 100%.
    pub fn try_from_bps(bps: u32) -> Result<Self, ValidationError> {
        if bps > Self::MAX_BPS {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(Discount(bps))
    }

    /// No discount.
    #[inline]
    pub const fn none() -> Self {
        Discount(0)
    }

    /// 100% off.
    #[inline]
    pub const fn full() -> Self {
        Discount(Self::MAX_BPS)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u32> for Discount {
    type Error = ValidationError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Discount::try_from_bps(bps)
    }
}

impl From<Discount> for u32 {
    fn from(discount: Discount) -> Self {
        discount.0
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_bps(self.0, f)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Products are immutable once created. The catalog shares them with cart
/// lines through `Arc`, so a line always reads the catalog's own record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Business key shown on receipts. Unique by convention only.
    pub reference: String,

    /// Display name shown to cashier and on receipt.
    pub description: String,

    /// Alternate lookup key for scanners. `None` when the source cell was blank.
    pub barcode: Option<String>,

    /// Unit sale price, never negative.
    pub price: Money,
}

impl Product {
    /// Creates a product, trimming text fields.
    ///
    /// ## Rules
    /// - `price` must be non-negative (zero is allowed: free items)
    /// - A blank barcode is stored as `None`
    ///
    /// ## Example
    /// ```rust
    /// use till_core::{Money, Product};
    ///
    /// let p = Product::new("A1", "Water 50cl", "", Money::from_cents(100)).unwrap();
    /// assert!(p.barcode.is_none());
    /// assert!(Product::new("A1", "Water", "", Money::from_cents(-1)).is_err());
    /// ```
    pub fn new(
        reference: impl Into<String>,
        description: impl Into<String>,
        barcode: impl Into<String>,
        price: Money,
    ) -> Result<Self, ValidationError> {
        if price.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: "price".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }

        let barcode = barcode.into().trim().to_string();
        Ok(Product {
            reference: reference.into().trim().to_string(),
            description: description.into().trim().to_string(),
            barcode: (!barcode.is_empty()).then_some(barcode),
            price,
        })
    }

    /// Returns the barcode, or an empty string when there is none.
    #[inline]
    pub fn barcode_or_empty(&self) -> &str {
        self.barcode.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_display() {
        assert_eq!(TaxRate::from_bps(2100).to_string(), "21.00");
        assert_eq!(TaxRate::from_bps(825).to_string(), "8.25");
        assert_eq!(TaxRate::zero().to_string(), "0.00");
        assert_eq!(TaxRate::default().bps(), 2100);
    }

    #[test]
    fn test_discount_bounds() {
        assert_eq!(Discount::from_bps(20_000), Discount::full());
        assert!(Discount::try_from_bps(10_000).is_ok());
        assert!(Discount::try_from_bps(10_001).is_err());
        assert_eq!(Discount::from_bps(1050).to_string(), "10.50");
    }

    #[test]
    fn test_discount_deserialize_rejects_over_100() {
        let ok: Discount = serde_json::from_str("500").unwrap();
        assert_eq!(ok.bps(), 500);
        assert!(serde_json::from_str::<Discount>("10001").is_err());
    }

    #[test]
    fn test_product_new_trims_and_normalizes() {
        let p = Product::new(" A1 ", " Water ", "  ", Money::from_cents(100)).unwrap();
        assert_eq!(p.reference, "A1");
        assert_eq!(p.description, "Water");
        assert_eq!(p.barcode, None);
        assert_eq!(p.barcode_or_empty(), "");

        let p = Product::new("A1", "Water", "8410001", Money::zero()).unwrap();
        assert_eq!(p.barcode.as_deref(), Some("8410001"));
    }

    #[test]
    fn test_product_rejects_negative_price() {
        let err = Product::new("A1", "Water", "", Money::from_cents(-1)).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }
}
