//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - Cart, session and import rule violations       │
//! │  └── ValidationError  - Bad quantity / price / discount input          │
//! │                                                                         │
//! │  till-store errors (separate crate)                                    │
//! │  └── StoreError       - State file, receipt file, CSV file failures    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → CLI message          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (reference, index, column)
//! 3. Errors are enum variants, never String
//! 4. Every failure leaves Catalog, Cart and CashSession untouched

use thiserror::Error;

use crate::import::MappedField;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// None of these are fatal. The operation that produced one made no
/// state change, so the caller can report it and let the user retry.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product matches the given reference or code.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A cart position that does not exist was edited or removed.
    #[error("Line {index} does not exist (cart has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    /// A sale was finalized while the cash session is closed.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart has 2 lines
    ///      │
    ///      ▼
    /// finalize(21%) ── session Closed ──► CashSessionNotOpen
    ///      │
    ///      ▼
    /// UI shows: "Open the cash session before charging"
    /// ```
    #[error("Cash session is not open")]
    CashSessionNotOpen,

    /// A sale was finalized with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Two required import fields point at the same CSV column.
    #[error("{first} and {second} both use column {column}")]
    MappingConflict {
        first: MappedField,
        second: MappedField,
        column: usize,
    },

    /// A mapping was built from a header name the file does not have.
    #[error("Column '{0}' not found in headers")]
    UnknownColumn(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// An amount does not fit in the money range.
    #[error("{field} is too large")]
    AmountTooLarge { field: String },

    /// Invalid format (e.g., "1.2.3" as a price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
