//! # till-store: Files, Printers and the Register
//!
//! The I/O layer of Till POS. It keeps `till-core` pure by owning every
//! file, process and clock access.
//!
//! ## Modules
//!
//! - [`paths`] - Application directory resolution (`TILL_HOME`, platform dirs)
//! - [`state`] - Settings and the JSON state file
//! - [`receipts`] - Timestamp-named receipt files
//! - [`device`] - Printer discovery and forwarding via CUPS tools
//! - [`dispatch`] - Store-then-print receipt dispatch
//! - [`csv_files`] - CSV preview, import and session export
//! - [`register`] - The register service used by the CLI
//!
//! ## Example
//!
//! ```rust,no_run
//! use till_core::{Discount, TaxRate};
//! use till_store::{AppPaths, LprDevice, Register};
//!
//! let paths = AppPaths::resolve()?;
//! let mut register = Register::open(&paths, Box::new(LprDevice::new()))?;
//!
//! register.open_session();
//! register.add_by_code("8410001", 2, None, Discount::none())?;
//! let sale = register.finalize(TaxRate::default())?;
//! println!("{}", sale.text);
//! register.persist()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod csv_files;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod paths;
pub mod receipts;
pub mod register;
pub mod state;

pub use csv_files::{export_quantities, import_csv, read_headers_and_preview, ImportPreview};
pub use device::{Device, DeviceWarning, LprDevice};
pub use dispatch::{DispatchStatus, Dispatched, ReceiptDispatcher};
pub use error::{StoreError, StoreResult};
pub use paths::AppPaths;
pub use receipts::ReceiptStore;
pub use register::{Clock, ClosedSession, Register, SaleCommit, SessionClose, SystemClock};
pub use state::{load_or_default, AppState, JsonStateStore, Settings, StateStore};
