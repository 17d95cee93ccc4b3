//! `till products`: list or search the catalog.

use std::io::Write;

use clap::Args;
use till_core::SearchField;
use till_store::Register;

use crate::error::CliResult;

use super::write_product;

#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// Text to look for (case-insensitive). Lists everything when omitted.
    #[arg(long, short, default_value = "")]
    pub query: String,

    /// Field to search: all, reference, description or barcode.
    #[arg(long, short, default_value = "all")]
    pub field: SearchField,
}

pub fn run<W: Write>(register: &Register, args: &ProductsArgs, out: &mut W) -> CliResult<()> {
    let mut count = 0usize;
    for product in register.search(&args.query, args.field) {
        write_product(out, product)?;
        count += 1;
    }
    writeln!(out, "{} of {} products", count, register.catalog().len())?;
    Ok(())
}
