//! # Application State
//!
//! Loads and saves the catalog and register settings.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TILL_PRINTER=Epson_TM20                                            │
//! │     TILL_TAX_RATE=10                                                   │
//! │                                                                         │
//! │  2. State File                                                         │
//! │     <app dir>/app_state.json                                           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no printer, Spanish ticket template, 21.00%                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## File Format
//! ```json
//! {
//!   "products": [
//!     { "reference": "A1", "description": "Agua", "barcode": "8410001", "price": 1.2 }
//!   ],
//!   "printer_name": null,
//!   "ticket_header": "*** Punto de venta ***",
//!   "ticket_footer": "¡Gracias por su compra!",
//!   "default_tax_rate": 21.0
//! }
//! ```
//!
//! Numbers in the file are decimal text to us: they are read back through
//! [`till_core::parse`] and never used in arithmetic as floats.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use till_core::parse::{parse_price, tax_rate_or};
use till_core::{Catalog, Money, Product, ReceiptTemplate, TaxRate};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

pub const PRINTER_ENV: &str = "TILL_PRINTER";
pub const TAX_RATE_ENV: &str = "TILL_TAX_RATE";

// =============================================================================
// Settings
// =============================================================================

/// Register settings kept next to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    /// Device receipts are forwarded to. `None` means store only.
    pub printer_name: Option<String>,
    pub template: ReceiptTemplate,
    /// Rate offered for the next sale.
    pub default_tax_rate: TaxRate,
}

impl Settings {
    /// Sets the ticket header. A blank header keeps the current one.
    pub fn set_header(&mut self, header: &str) {
        if header.trim().is_empty() {
            debug!("Blank ticket header ignored");
            return;
        }
        self.template.header = header.to_string();
    }

    /// Sets the ticket footer. Empty removes it from receipts.
    pub fn set_footer(&mut self, footer: &str) {
        self.template.footer = footer.to_string();
    }

    /// Sets the printer. `None` or a blank name means no device.
    pub fn set_printer(&mut self, printer: Option<&str>) {
        self.printer_name = printer
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
    }

    /// Applies `TILL_PRINTER` and `TILL_TAX_RATE`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(printer) = lookup(PRINTER_ENV) {
            debug!(printer = %printer, "Overriding printer from environment");
            self.set_printer(Some(&printer));
        }

        if let Some(rate) = lookup(TAX_RATE_ENV) {
            match tax_rate_or(&rate, self.default_tax_rate) {
                Ok(parsed) => {
                    debug!(rate = %parsed, "Overriding default tax rate from environment");
                    self.default_tax_rate = parsed;
                }
                Err(e) => warn!(rate = %rate, error = %e, "Ignoring invalid tax rate in environment"),
            }
        }
    }
}

/// Everything the register restores at startup.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub catalog: Catalog,
    pub settings: Settings,
}

// =============================================================================
// State Store
// =============================================================================

/// Loads and saves [`AppState`].
pub trait StateStore {
    /// Loads the saved state. A store with nothing saved yet returns the
    /// default state.
    fn load(&self) -> StoreResult<AppState>;

    fn save(&self, catalog: &Catalog, settings: &Settings) -> StoreResult<()>;
}

/// Loads state, degrading to the default state when loading fails.
pub fn load_or_default(store: &dyn StateStore) -> AppState {
    store.load().unwrap_or_else(|e| {
        warn!("Failed to load app state: {}. Using defaults.", e);
        AppState::default()
    })
}

/// JSON file backed [`StateStore`].
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> StoreResult<AppState> {
        if !self.path.exists() {
            debug!(path = ?self.path, "State file not found, using defaults");
            return Ok(AppState::default());
        }

        info!(path = ?self.path, "Loading app state");
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::persistence(&self.path, e))?;
        let file: StateFile = serde_json::from_str(&contents)?;
        Ok(file.into_state())
    }

    fn save(&self, catalog: &Catalog, settings: &Settings) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::persistence(parent, e))?;
        }

        let contents = serde_json::to_string_pretty(&StateFile::from_state(catalog, settings))?;

        // Write beside the target and rename so a failed write leaves the old file intact.
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, contents).map_err(|e| StoreError::persistence(&staging, e))?;
        std::fs::rename(&staging, &self.path).map_err(|e| StoreError::persistence(&self.path, e))?;

        info!(path = ?self.path, products = catalog.len(), "App state saved");
        Ok(())
    }
}

// =============================================================================
// File Format
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct ProductRecord {
    reference: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    barcode: String,
    price: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    products: Vec<ProductRecord>,
    #[serde(default)]
    printer_name: Option<String>,
    #[serde(default = "default_header")]
    ticket_header: String,
    #[serde(default = "default_footer")]
    ticket_footer: String,
    #[serde(default = "default_tax_rate")]
    default_tax_rate: f64,
}

fn default_header() -> String {
    ReceiptTemplate::default().header
}

fn default_footer() -> String {
    ReceiptTemplate::default().footer
}

fn default_tax_rate() -> f64 {
    bps_as_percent(TaxRate::default())
}

fn bps_as_percent(rate: TaxRate) -> f64 {
    rate.bps() as f64 / 100.0
}

impl StateFile {
    fn from_state(catalog: &Catalog, settings: &Settings) -> Self {
        StateFile {
            products: catalog
                .iter()
                .map(|p| ProductRecord {
                    reference: p.reference.clone(),
                    description: p.description.clone(),
                    barcode: p.barcode_or_empty().to_string(),
                    price: p.price.as_major_f64(),
                })
                .collect(),
            printer_name: settings.printer_name.clone(),
            ticket_header: settings.template.header.clone(),
            ticket_footer: settings.template.footer.clone(),
            default_tax_rate: bps_as_percent(settings.default_tax_rate),
        }
    }

    fn into_state(self) -> AppState {
        let mut catalog = Catalog::new();
        for record in self.products {
            match record_to_product(&record) {
                Some(product) => {
                    catalog.add(product);
                }
                None => warn!(reference = %record.reference, price = record.price, "Skipping unreadable product in state file"),
            }
        }

        let mut settings = Settings {
            template: ReceiptTemplate {
                header: self.ticket_header,
                footer: self.ticket_footer,
            },
            ..Settings::default()
        };
        settings.set_printer(self.printer_name.as_deref());
        settings.default_tax_rate = match tax_rate_or(&self.default_tax_rate.to_string(), TaxRate::default()) {
            Ok(rate) => rate,
            Err(e) => {
                warn!(error = %e, "Invalid default tax rate in state file, using 21.00");
                TaxRate::default()
            }
        };

        AppState { catalog, settings }
    }
}

fn record_to_product(record: &ProductRecord) -> Option<Product> {
    let price: Money = parse_price(&record.price.to_string())?;
    Product::new(&record.reference, &record.description, &record.barcode, price).ok()
}
