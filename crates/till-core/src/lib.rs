//! # till-core: Pure Business Logic for Till POS
//!
//! This crate is the **heart** of Till POS: the transaction and cash-session
//! engine, written as plain data and pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    till (CLI register)                          │   │
//! │  │    import ──► products ──► register: add / edit / pay / close   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                till-store (Register service)                    │   │
//! │  │    JSON state • receipt files • printers • CSV files            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ catalog  │ │   cart   │ │ session  │ │ receipt  │          │   │
//! │  │   │ import   │ │  money   │ │ summary  │ │  parse   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO CLOCK • PURE FUNCTIONS                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, TaxRate, Discount
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`parse`] - The one place decimal text becomes cents / basis points
//! - [`catalog`] - Append-only product list with code lookup and search
//! - [`import`] - CSV column mapping and row import
//! - [`cart`] - Sale lines and ticket totals
//! - [`session`] - Cash session state machine and finalized sales
//! - [`summary`] - Close-of-day aggregation
//! - [`receipt`] - Canonical receipt text
//! - [`error`] / [`validation`] - Domain errors and input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use till_core::{Cart, CashSession, Discount, Money, Product, TaxRate};
//!
//! let water = Arc::new(Product::new("A1", "Agua", "", Money::from_cents(1000)).unwrap());
//! let now = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap().and_hms_opt(9, 0, 0).unwrap();
//!
//! let mut cart = Cart::new();
//! cart.add_line(water, 3, None, Discount::from_bps(1000)).unwrap();
//!
//! let mut session = CashSession::new();
//! session.open(now);
//! let sale = session.finalize(&mut cart, TaxRate::from_bps(2100), now).unwrap();
//!
//! assert_eq!(sale.totals().total.cents(), 3267); // $27.00 + $5.67
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod import;
pub mod money;
pub mod parse;
pub mod receipt;
pub mod session;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, SaleLine, SaleTotals};
pub use catalog::{Catalog, SearchField};
pub use error::{CoreError, CoreResult, ValidationError};
pub use import::{import_rows, ColumnMapping, ImportReport, MappedField};
pub use money::Money;
pub use receipt::ReceiptTemplate;
pub use session::{CashSession, CloseOutcome, FinalizedSale, OpenOutcome, SessionState};
pub use summary::{summarize, CloseSummary};
pub use types::*;
