//! # Validation Module
//!
//! Input validation utilities for Till POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: parse (text → cents / bps)                                   │
//! │  ├── Blank or unreadable text falls back to a default                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (business ranges)                                │
//! │  ├── quantity ≥ 1, price ≥ 0, discount 0..=100                         │
//! │  ├── quantity × price within the money range (SaleLine::new)           │
//! │  └── UI-only caps (tax rate ≤ 30%)                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart / CashSession operations                                │
//! │  └── Nothing is mutated until every check has passed                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::TaxRate;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Highest tax rate the register UI lets a cashier type (30.00%).
pub const MAX_UI_TAX_RATE_BPS: u32 = 3_000;

/// Validates a quantity value.
///
/// ## User Workflow
/// ```text
/// User enters quantity: 0
///      │
///      ▼
/// validate_quantity(0) ← THIS FUNCTION
///      │
///      ├── qty <= 0? → Error: "quantity must be positive"
///      │
///      └── OK → Proceed with add_line / edit_line
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use till_core::money::Money;
/// use till_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(1099)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate typed into the register screen.
///
/// The engine itself accepts any rate; only interactive entry is capped.
pub fn validate_ui_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if rate.bps() > MAX_UI_TAX_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0,
            max: (MAX_UI_TAX_RATE_BPS / 100) as i64,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_ui_tax_rate() {
        assert!(validate_ui_tax_rate(TaxRate::zero()).is_ok());
        assert!(validate_ui_tax_rate(TaxRate::from_bps(3000)).is_ok());
        assert!(validate_ui_tax_rate(TaxRate::from_bps(3001)).is_err());
    }
}
