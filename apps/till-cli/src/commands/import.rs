//! `till import`: bring products in from a CSV file.
//!
//! ```text
//! till import productos.csv --preview
//!   columns: 1 sku | 2 nombre | 3 ean | 4 pvp
//!   ...three sample rows...
//!   mapping: reference=1 description=2 barcode=3 price=4
//!
//! till import productos.csv --price pvp --barcode 3
//!   Imported 120 products (2 rows skipped, 0 duplicate references)
//! ```
//!
//! Columns are given either as 1-based numbers or as header names.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use till_core::{ColumnMapping, CoreError, MappedField};
use till_store::{read_headers_and_preview, ImportPreview, Register};
use tracing::info;

use crate::error::{CliError, CliResult};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// CSV file with a header row.
    pub file: PathBuf,

    /// Column holding the reference (number or header name).
    #[arg(long)]
    pub reference: Option<String>,

    /// Column holding the description.
    #[arg(long)]
    pub description: Option<String>,

    /// Column holding the barcode.
    #[arg(long)]
    pub barcode: Option<String>,

    /// Column holding the price.
    #[arg(long)]
    pub price: Option<String>,

    /// Show the headers, sample rows and mapping without importing.
    #[arg(long, default_value_t = false)]
    pub preview: bool,
}

impl ImportArgs {
    fn column_arg(&self, field: MappedField) -> Option<&str> {
        match field {
            MappedField::Reference => self.reference.as_deref(),
            MappedField::Description => self.description.as_deref(),
            MappedField::Barcode => self.barcode.as_deref(),
            MappedField::Price => self.price.as_deref(),
        }
    }
}

/// Resolves a column given as a 1-based number or a header name.
fn resolve_column(spec: &str, headers: &[String]) -> CliResult<usize> {
    let spec = spec.trim();
    if let Ok(number) = spec.parse::<usize>() {
        return match number {
            n if (1..=headers.len()).contains(&n) => Ok(n - 1),
            n => Err(CliError::usage(format!(
                "Column {} out of range (file has {} columns)",
                n,
                headers.len()
            ))),
        };
    }

    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(spec))
        .ok_or_else(|| CoreError::UnknownColumn(spec.to_string()).into())
}

/// The proposed mapping with any explicit columns applied.
fn build_mapping(args: &ImportArgs, preview: &ImportPreview) -> CliResult<ColumnMapping> {
    let mut mapping = preview.proposed;
    for field in MappedField::ALL {
        if let Some(spec) = args.column_arg(field) {
            let column = resolve_column(spec, &preview.headers)?;
            match field {
                MappedField::Reference => mapping.reference = column,
                MappedField::Description => mapping.description = column,
                MappedField::Barcode => mapping.barcode = column,
                MappedField::Price => mapping.price = column,
            }
        }
    }
    Ok(mapping)
}

fn write_preview<W: Write>(out: &mut W, preview: &ImportPreview, mapping: &ColumnMapping) -> CliResult<()> {
    let columns: Vec<String> = preview
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{} {}", i + 1, h))
        .collect();
    writeln!(out, "columns: {}", columns.join(" | "))?;
    for row in &preview.rows {
        writeln!(out, "  {}", row.join(" | "))?;
    }

    let fields: Vec<String> = MappedField::ALL
        .iter()
        .map(|&f| format!("{}={}", f, mapping.column(f) + 1))
        .collect();
    writeln!(out, "mapping: {}", fields.join(" "))?;
    Ok(())
}

pub fn run<W: Write>(register: &mut Register, args: &ImportArgs, out: &mut W) -> CliResult<()> {
    let preview = read_headers_and_preview(&args.file)?;
    let mapping = build_mapping(args, &preview)?;

    if args.preview {
        write_preview(out, &preview, &mapping)?;
        return Ok(());
    }

    let report = register.import_csv(&args.file, &mapping)?;
    register.persist()?;
    info!(file = ?args.file, imported = report.imported, "Products imported");

    writeln!(
        out,
        "Imported {} products ({} rows skipped, {} duplicate references)",
        report.imported,
        report.skipped.len(),
        report.duplicates
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        ["sku", "nombre", "ean", "pvp"].map(String::from).to_vec()
    }

    fn args(file: &str) -> ImportArgs {
        ImportArgs {
            file: PathBuf::from(file),
            reference: None,
            description: None,
            barcode: None,
            price: None,
            preview: false,
        }
    }

    #[test]
    fn test_resolve_column_by_number_or_name() {
        assert_eq!(resolve_column("2", &headers()).unwrap(), 1);
        assert_eq!(resolve_column("PVP", &headers()).unwrap(), 3);
        assert!(matches!(resolve_column("0", &headers()), Err(CliError::Usage(_))));
        assert!(matches!(resolve_column("stock", &headers()), Err(CliError::Core(CoreError::UnknownColumn(_)))));
    }

    #[test]
    fn test_explicit_columns_override_proposal() {
        let preview = ImportPreview {
            headers: headers(),
            rows: Vec::new(),
            proposed: ColumnMapping::propose(&headers()),
        };
        let mut a = args("p.csv");
        a.price = Some("ean".to_string());
        a.barcode = Some("4".to_string());

        let mapping = build_mapping(&a, &preview).unwrap();
        assert_eq!(mapping, ColumnMapping { reference: 0, description: 1, barcode: 3, price: 2 });
    }

    #[test]
    fn test_preview_output() {
        let preview = ImportPreview {
            headers: headers(),
            rows: vec![["A1", "Agua", "8410001", "1,20"].map(String::from).to_vec()],
            proposed: ColumnMapping::propose(&headers()),
        };
        let mut out = Vec::new();
        write_preview(&mut out, &preview, &preview.proposed).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("columns: 1 sku | 2 nombre | 3 ean | 4 pvp\n"));
        assert!(text.contains("  A1 | Agua | 8410001 | 1,20\n"));
        assert!(text.ends_with("mapping: reference=1 description=2 barcode=3 price=4\n"));
    }
}
