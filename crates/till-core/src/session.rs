//! # Cash Session
//!
//! The open/closed bracket of a working day. Sales can only be charged
//! while the session is open, and closing it produces the day's summary.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │        open()                          finalize(cart, rate)             │
//! │   ┌──────────────┐                    ┌──────────────┐                 │
//! │   │              ▼                    │              │                 │
//! │ ┌─┴──────┐   ┌────────┐               │              ▼                 │
//! │ │ Closed │   │  Open  │───────────────┘   sales.push(FinalizedSale)    │
//! │ └────────┘   └───┬────┘                   cart.clear()                 │
//! │   ▲              │                                                      │
//! │   └──────────────┘                                                      │
//! │        close()  → summarize(sales), sales.clear()                       │
//! │                                                                         │
//! │  open() while Open     → AlreadyOpen   (no-op, not an error)           │
//! │  close() while Closed  → AlreadyClosed (no-op, not an error)           │
//! │  finalize() while Closed → CashSessionNotOpen                          │
//! │  finalize() on empty cart → EmptyCart                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering and dispatching the receipts is the caller's job; this module
//! only returns the committed values.

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::cart::{Cart, SaleLine, SaleTotals};
use crate::error::{CoreError, CoreResult};
use crate::summary::{summarize, CloseSummary};
use crate::types::TaxRate;

// =============================================================================
// Session State
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Closed,
    Open,
}

/// Result of [`CashSession::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    AlreadyOpen,
}

/// Result of [`CashSession::close`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed(CloseSummary),
    AlreadyClosed,
}

// =============================================================================
// Finalized Sale
// =============================================================================

/// An immutable snapshot of a charged cart.
///
/// The lines and the tax rate are fixed at finalize time; later changes to
/// the default rate never touch a sale already recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedSale {
    id: Uuid,
    lines: Vec<SaleLine>,
    tax_rate: TaxRate,
    finalized_at: NaiveDateTime,
}

impl FinalizedSale {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lines(&self) -> &[SaleLine] {
        &self.lines
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn finalized_at(&self) -> NaiveDateTime {
        self.finalized_at
    }

    /// Subtotal, tax at this sale's own rate, and total.
    pub fn totals(&self) -> SaleTotals {
        SaleTotals::compute(&self.lines, self.tax_rate)
    }
}

// =============================================================================
// Cash Session
// =============================================================================

/// The register's cash session.
#[derive(Debug, Clone, Default)]
pub struct CashSession {
    state: SessionState,
    sales: Vec<FinalizedSale>,
    opened_at: Option<NaiveDateTime>,
}

impl CashSession {
    /// Creates a closed session with no sales.
    pub fn new() -> Self {
        CashSession::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn opened_at(&self) -> Option<NaiveDateTime> {
        self.opened_at
    }

    /// Sales finalized since the session opened, oldest first.
    pub fn sales(&self) -> &[FinalizedSale] {
        &self.sales
    }

    /// Opens the session, dropping any stale sales.
    pub fn open(&mut self, now: NaiveDateTime) -> OpenOutcome {
        if self.is_open() {
            return OpenOutcome::AlreadyOpen;
        }

        self.sales.clear();
        self.state = SessionState::Open;
        self.opened_at = Some(now);
        OpenOutcome::Opened
    }

    /// Closes the session and returns the summary of everything it sold.
    pub fn close(&mut self) -> CloseOutcome {
        if !self.is_open() {
            return CloseOutcome::AlreadyClosed;
        }

        let summary = summarize(&self.sales);
        self.sales.clear();
        self.state = SessionState::Closed;
        self.opened_at = None;
        CloseOutcome::Closed(summary)
    }

    /// Commits `cart` as a new sale at `tax_rate` and empties the cart.
    ///
    /// ## Errors
    /// - [`CoreError::CashSessionNotOpen`] when the session is closed
    /// - [`CoreError::EmptyCart`] when there is nothing to charge
    ///
    /// Neither the cart nor the session changes on error.
    pub fn finalize(
        &mut self,
        cart: &mut Cart,
        tax_rate: TaxRate,
        now: NaiveDateTime,
    ) -> CoreResult<&FinalizedSale> {
        if !self.is_open() {
            return Err(CoreError::CashSessionNotOpen);
        }
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        self.sales.push(FinalizedSale {
            id: Uuid::new_v4(),
            lines: cart.take_lines(),
            tax_rate,
            finalized_at: now,
        });

        let index = self.sales.len() - 1;
        Ok(&self.sales[index])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
