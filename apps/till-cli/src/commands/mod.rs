//! # Commands
//!
//! One module per `till` subcommand. Every command writes to a generic
//! `Write` so the output can be checked in tests.
//!
//! ```text
//! main.rs ──► Register::open ──► products::run
//!                                import::run
//!                                printers::run
//!                                config::run
//!                                register::run  (interactive loop)
//! ```

pub mod config;
pub mod import;
pub mod printers;
pub mod products;
pub mod register;

use std::io::{self, Write};

use till_core::Product;
use till_store::{DispatchStatus, Dispatched, StoreResult};

/// One catalog row: reference, description, barcode, price.
pub(crate) fn write_product<W: Write>(out: &mut W, product: &Product) -> io::Result<()> {
    writeln!(
        out,
        "{:<12} {:<32} {:<14} {:>12}",
        product.reference,
        product.description,
        product.barcode_or_empty(),
        product.price.to_string()
    )
}

/// Reports where a receipt went.
pub(crate) fn write_dispatch<W: Write>(out: &mut W, receipt: &StoreResult<Dispatched>) -> io::Result<()> {
    match receipt {
        Ok(Dispatched { path, status }) => {
            writeln!(out, "Receipt saved to {}", path.display())?;
            match status {
                DispatchStatus::Printed { device } => writeln!(out, "Printed on {}", device),
                DispatchStatus::Unprinted => writeln!(out, "No printer configured"),
                DispatchStatus::Warning(warning) => writeln!(out, "Warning: {}", warning),
            }
        }
        Err(e) => writeln!(out, "Receipt NOT saved: {}", e),
    }
}
