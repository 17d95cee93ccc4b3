//! # Receipt Dispatcher
//!
//! Stores a receipt, then tries to print it.
//!
//! ```text
//! dispatch(text)
//!    │
//!    ├─► ReceiptStore::write ── error ──► StoreError::Persistence (stop)
//!    │
//!    ├─► no printer configured ─────────► Unprinted
//!    │
//!    └─► Device::forward ─┬─ ok ────────► Printed { device }
//!                         └─ warning ───► Warning(DeviceWarning)
//! ```

use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::device::{Device, DeviceWarning};
use crate::error::StoreResult;
use crate::receipts::ReceiptStore;

/// What happened after the receipt was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    Printed { device: String },
    /// No printer configured; the receipt is only stored.
    Unprinted,
    /// Printing failed. The stored receipt is still valid.
    Warning(DeviceWarning),
}

/// A stored receipt and its print outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub path: PathBuf,
    pub status: DispatchStatus,
}

pub struct ReceiptDispatcher {
    store: ReceiptStore,
    device: Box<dyn Device>,
}

impl ReceiptDispatcher {
    pub fn new(store: ReceiptStore, device: Box<dyn Device>) -> Self {
        ReceiptDispatcher { store, device }
    }

    pub fn store(&self) -> &ReceiptStore {
        &self.store
    }

    pub fn available_devices(&self) -> Vec<String> {
        self.device.list_available()
    }

    /// Stores `text` and forwards it to `printer` when one is given.
    ///
    /// Only a failed write is an error. Device trouble comes back as
    /// [`DispatchStatus::Warning`].
    pub fn dispatch(&self, text: &str, printer: Option<&str>, now: NaiveDateTime) -> StoreResult<Dispatched> {
        let path = self.store.write(text, now)?;

        let status = match printer.map(str::trim).filter(|name| !name.is_empty()) {
            None => DispatchStatus::Unprinted,
            Some(device) => match self.device.forward(device, text) {
                Ok(()) => {
                    info!(device, ?path, "Receipt printed");
                    DispatchStatus::Printed {
                        device: device.to_string(),
                    }
                }
                Err(warning) => {
                    warn!(?path, %warning, "Receipt stored but not printed");
                    DispatchStatus::Warning(warning)
                }
            },
        };

        Ok(Dispatched { path, status })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scriptable [`Device`] for tests.

    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Behavior {
        Accept,
        Unavailable,
        Reject,
    }

    /// Records every forwarded receipt.
    #[derive(Clone)]
    pub struct FakeDevice {
        pub behavior: Behavior,
        pub printed: Rc<RefCell<Vec<(String, String)>>>,
    }

    impl FakeDevice {
        pub fn new(behavior: Behavior) -> Self {
            FakeDevice {
                behavior,
                printed: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl Device for FakeDevice {
        fn list_available(&self) -> Vec<String> {
            vec!["Epson".to_string(), "Zebra".to_string()]
        }

        fn forward(&self, device: &str, text: &str) -> Result<(), DeviceWarning> {
            match self.behavior {
                Behavior::Accept => {
                    self.printed
                        .borrow_mut()
                        .push((device.to_string(), text.to_string()));
                    Ok(())
                }
                Behavior::Unavailable => Err(DeviceWarning::Unavailable {
                    device: device.to_string(),
                    reason: "lpr not found".to_string(),
                }),
                Behavior::Reject => Err(DeviceWarning::Rejected {
                    device: device.to_string(),
                    message: "paper out".to_string(),
                }),
            }
        }
    }
}
