//! # Register Service
//!
//! One till: the catalog, the sale being built, the cash session and the
//! settings, wired to the state file, the receipt store and the printer.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_line / add_by_code ──► Cart ──► finalize(rate)                    │
//! │                                         │                               │
//! │                     CashSession::finalize (Open + non-empty cart)      │
//! │                                         │                               │
//! │                         ReceiptTemplate::format_sale                    │
//! │                                         │                               │
//! │                    ReceiptDispatcher::dispatch (store, then print)     │
//! │                                                                         │
//! │  close_session ──► optional CSV export ──► CashSession::close          │
//! │                 ──► format_close ──► dispatch                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A sale or close is committed before its receipt is dispatched. A failed
//! receipt write is returned next to the committed result and never undoes
//! it. Nothing is saved to the state file until [`Register::persist`].

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use till_core::catalog::Search;
use till_core::{
    summarize, Cart, CashSession, Catalog, CloseOutcome, CloseSummary, ColumnMapping, CoreError,
    CoreResult, Discount, ImportReport, Money, OpenOutcome, SaleLine, SaleTotals, SearchField,
    TaxRate,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::csv_files;
use crate::device::Device;
use crate::dispatch::{Dispatched, ReceiptDispatcher};
use crate::error::{StoreError, StoreResult};
use crate::paths::AppPaths;
use crate::receipts::ReceiptStore;
use crate::state::{load_or_default, AppState, JsonStateStore, Settings, StateStore};

// =============================================================================
// Clock
// =============================================================================

/// Source of receipt timestamps.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// A committed sale and its receipt.
#[derive(Debug)]
pub struct SaleCommit {
    pub sale_id: Uuid,
    pub totals: SaleTotals,
    pub text: String,
    /// The sale stays committed even when this is an error.
    pub receipt: StoreResult<Dispatched>,
}

/// A closed session and its receipt.
#[derive(Debug)]
pub struct ClosedSession {
    pub summary: CloseSummary,
    pub text: String,
    pub receipt: StoreResult<Dispatched>,
    /// Where the quantities were exported, when an export was asked for
    /// and the session had sales.
    pub exported: Option<PathBuf>,
}

#[derive(Debug)]
pub enum SessionClose {
    Closed(ClosedSession),
    AlreadyClosed,
}

// =============================================================================
// Register
// =============================================================================

pub struct Register {
    catalog: Catalog,
    cart: Cart,
    session: CashSession,
    settings: Settings,
    dispatcher: ReceiptDispatcher,
    state_store: Box<dyn StateStore>,
    clock: Box<dyn Clock>,
}

impl Register {
    pub fn new(
        state: AppState,
        state_store: Box<dyn StateStore>,
        dispatcher: ReceiptDispatcher,
        clock: Box<dyn Clock>,
    ) -> Self {
        Register {
            catalog: state.catalog,
            cart: Cart::new(),
            session: CashSession::new(),
            settings: state.settings,
            dispatcher,
            state_store,
            clock,
        }
    }

    /// Opens the register stored under `paths`.
    ///
    /// A state file that cannot be read is logged and replaced by defaults.
    /// Environment overrides are applied on top.
    pub fn open(paths: &AppPaths, device: Box<dyn Device>) -> StoreResult<Self> {
        paths.ensure()?;

        let store = JsonStateStore::new(paths.state_file());
        let mut state = load_or_default(&store);
        state.settings.apply_env_overrides();
        info!(
            root = ?paths.root(),
            products = state.catalog.len(),
            printer = ?state.settings.printer_name,
            "Register ready"
        );

        let dispatcher = ReceiptDispatcher::new(ReceiptStore::new(paths.receipts_dir()), device);
        Ok(Register::new(state, Box::new(store), dispatcher, Box::new(SystemClock)))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn session(&self) -> &CashSession {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn receipts_dir(&self) -> &Path {
        self.dispatcher.store().dir()
    }

    // =========================================================================
    // Cash Session
    // =========================================================================

    pub fn open_session(&mut self) -> OpenOutcome {
        let outcome = self.session.open(self.clock.now());
        match outcome {
            OpenOutcome::Opened => info!("Cash session opened"),
            OpenOutcome::AlreadyOpen => info!("Cash session already open"),
        }
        outcome
    }

    /// Closes the session, printing the close receipt.
    ///
    /// With `export`, the per-reference quantities are first written there
    /// as CSV. A failed export leaves the session open.
    pub fn close_session(&mut self, export: Option<&Path>) -> StoreResult<SessionClose> {
        if !self.session.is_open() {
            info!("Cash session already closed");
            return Ok(SessionClose::AlreadyClosed);
        }

        let exported = match export {
            Some(path) if !self.session.sales().is_empty() => {
                csv_files::export_quantities(path, &summarize(self.session.sales()))?;
                Some(path.to_path_buf())
            }
            Some(path) => {
                info!(?path, "No sales in session, export skipped");
                None
            }
            None => None,
        };

        let summary = match self.session.close() {
            CloseOutcome::Closed(summary) => summary,
            CloseOutcome::AlreadyClosed => return Ok(SessionClose::AlreadyClosed),
        };

        let now = self.clock.now();
        let text = self.settings.template.format_close(&summary, now);
        let receipt = self
            .dispatcher
            .dispatch(&text, self.settings.printer_name.as_deref(), now);
        if let Err(e) = &receipt {
            warn!(error = %e, "Close receipt could not be stored");
        }

        info!(
            sales = summary.sale_count,
            total = %summary.grand_total,
            "Cash session closed"
        );
        Ok(SessionClose::Closed(ClosedSession {
            summary,
            text,
            receipt,
            exported,
        }))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds `reference` to the cart. `price` replaces the catalog price for
    /// this line only.
    pub fn add_line(
        &mut self,
        reference: &str,
        quantity: i64,
        price: Option<Money>,
        discount: Discount,
    ) -> CoreResult<&SaleLine> {
        let product = self
            .catalog
            .find_by_reference(reference)
            .cloned()
            .ok_or_else(|| CoreError::ProductNotFound(reference.to_string()))?;
        self.cart.add_line(product, quantity, price, discount)
    }

    /// Adds the product whose barcode or reference is `code`.
    pub fn add_by_code(
        &mut self,
        code: &str,
        quantity: i64,
        price: Option<Money>,
        discount: Discount,
    ) -> CoreResult<&SaleLine> {
        let product = self
            .catalog
            .find_by_code(code)
            .cloned()
            .ok_or_else(|| CoreError::ProductNotFound(code.trim().to_string()))?;
        self.cart.add_line(product, quantity, price, discount)
    }

    pub fn edit_line(
        &mut self,
        index: usize,
        quantity: i64,
        unit_price: Money,
        discount: Discount,
    ) -> CoreResult<&SaleLine> {
        self.cart.edit_line(index, quantity, unit_price, discount)
    }

    pub fn remove_line(&mut self, index: usize) -> CoreResult<SaleLine> {
        self.cart.remove_line(index)
    }

    /// Charges the cart at `tax_rate` and dispatches the receipt.
    ///
    /// On success `tax_rate` becomes the default for the next sale.
    pub fn finalize(&mut self, tax_rate: TaxRate) -> CoreResult<SaleCommit> {
        let now = self.clock.now();
        let sale = self.session.finalize(&mut self.cart, tax_rate, now)?;

        let sale_id = sale.id();
        let totals = sale.totals();
        let text = self.settings.template.format_sale(sale, now);
        self.settings.default_tax_rate = tax_rate;

        let receipt = self
            .dispatcher
            .dispatch(&text, self.settings.printer_name.as_deref(), now);
        if let Err(e) = &receipt {
            warn!(sale_id = %sale_id, error = %e, "Sale receipt could not be stored");
        }

        info!(sale_id = %sale_id, total = %totals.total, rate = %tax_rate, "Sale finalized");
        Ok(SaleCommit {
            sale_id,
            totals,
            text,
            receipt,
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Imports `path` into the catalog with `mapping`.
    pub fn import_csv(&mut self, path: &Path, mapping: &ColumnMapping) -> StoreResult<ImportReport> {
        let report = csv_files::import_csv(path, mapping, &mut self.catalog)?;
        if report.duplicates > 0 {
            warn!(
                duplicates = report.duplicates,
                "Imported references already in catalog; lookups keep the first"
            );
        }
        Ok(report)
    }

    pub fn search<'a>(&'a self, query: &str, field: SearchField) -> Search<'a> {
        self.catalog.search(query, field)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn set_printer(&mut self, printer: Option<&str>) {
        self.settings.set_printer(printer);
    }

    pub fn set_header(&mut self, header: &str) {
        self.settings.set_header(header);
    }

    pub fn set_footer(&mut self, footer: &str) {
        self.settings.set_footer(footer);
    }

    pub fn set_default_tax_rate(&mut self, rate: TaxRate) {
        self.settings.default_tax_rate = rate;
    }

    pub fn available_devices(&self) -> Vec<String> {
        self.dispatcher.available_devices()
    }

    /// Saves the catalog and settings. In-memory state is kept on failure.
    pub fn persist(&self) -> StoreResult<()> {
        self.state_store
            .save(&self.catalog, &self.settings)
            .inspect_err(|e: &StoreError| warn!(error = %e, "App state not saved"))
    }
}
