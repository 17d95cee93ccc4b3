//! # CSV Files
//!
//! Product import from arbitrary CSV layouts and the end-of-day quantity
//! export.
//!
//! ## Import Flow
//! ```text
//! ┌──────────────┐   headers + 3 rows   ┌──────────────┐
//! │  products.csv │ ──────────────────► │  preview UI  │ ── user picks columns
//! └──────┬───────┘                      └──────┬───────┘
//!        │                                     │ ColumnMapping
//!        ▼                                     ▼
//!   CsvRow records ───────────────► till_core::import_rows ──► Catalog
//! ```

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Writer};
use till_core::import::Row;
use till_core::summary::CloseSummary;
use till_core::{import_rows, Catalog, ColumnMapping, ImportReport};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Data rows shown next to the headers before mapping.
pub const PREVIEW_ROWS: usize = 3;

/// One CSV record as an import row.
#[derive(Debug, Clone)]
pub struct CsvRow(pub StringRecord);

impl Row for CsvRow {
    fn cell(&self, index: usize) -> Option<&str> {
        self.0.get(index)
    }
}

/// Headers, sample rows and a proposed mapping for a CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub proposed: ColumnMapping,
}

fn open(path: &Path) -> StoreResult<csv::Reader<std::fs::File>> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(StoreError::from)
}

fn headers_of(reader: &mut csv::Reader<std::fs::File>, path: &Path) -> StoreResult<Vec<String>> {
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(StoreError::EmptyImportFile(path.to_path_buf()));
    }
    Ok(headers)
}

/// Reads the header row and the first [`PREVIEW_ROWS`] data rows.
pub fn read_headers_and_preview(path: &Path) -> StoreResult<ImportPreview> {
    let mut reader = open(path)?;
    let headers = headers_of(&mut reader, path)?;

    let mut rows = Vec::with_capacity(PREVIEW_ROWS);
    for record in reader.records().take(PREVIEW_ROWS) {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    let proposed = ColumnMapping::propose(&headers);
    debug!(?path, columns = headers.len(), "CSV preview read");
    Ok(ImportPreview {
        headers,
        rows,
        proposed,
    })
}

/// Imports every data row of `path` into `catalog`.
///
/// The mapping is checked and the whole file is read before the first
/// product is appended, so a conflict or an unreadable file leaves the
/// catalog untouched. Rows that fail to map are skipped.
pub fn import_csv(path: &Path, mapping: &ColumnMapping, catalog: &mut Catalog) -> StoreResult<ImportReport> {
    mapping.validate()?;

    let mut reader = open(path)?;
    headers_of(&mut reader, path)?;
    let rows = reader
        .into_records()
        .map(|record| record.map(CsvRow))
        .collect::<Result<Vec<_>, _>>()?;

    let report = import_rows(rows, mapping, catalog)?;
    for skipped in &report.skipped {
        debug!(row = skipped.row, reason = %skipped.reason, "Import row skipped");
    }
    info!(
        ?path,
        imported = report.imported,
        skipped = report.skipped.len(),
        duplicates = report.duplicates,
        "CSV import finished"
    );
    Ok(report)
}

/// Writes the per-reference quantities of `summary` as `reference,quantity`.
///
/// Returns the number of data rows written.
pub fn export_quantities(path: &Path, summary: &CloseSummary) -> StoreResult<usize> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["reference", "quantity"])?;
    for q in &summary.quantities {
        writer.write_record([q.reference.as_str(), q.quantity.to_string().as_str()])?;
    }
    writer.flush().map_err(|e| StoreError::persistence(path, e))?;

    info!(?path, rows = summary.quantities.len(), "Session quantities exported");
    Ok(summary.quantities.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::summary::ProductQuantity;
    use till_core::CoreError;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const PRODUCTS: &str = "\
sku,nombre,ean,pvp,stock
A1,Agua,8410001,\"1,20\",50
B2,Pan,,0.85,10
C3,Aceite,8410003,abc,5
D4,Sal
E5,Leche,8410005,1.05,7
";

    #[test]
    fn test_preview_shows_headers_and_three_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "p.csv", PRODUCTS);

        let preview = read_headers_and_preview(&path).unwrap();
        assert_eq!(preview.headers, ["sku", "nombre", "ean", "pvp", "stock"]);
        assert_eq!(preview.rows.len(), 3);
        assert_eq!(preview.rows[0][3], "1,20");
        assert_eq!(
            preview.proposed,
            ColumnMapping { reference: 0, description: 1, barcode: 2, price: 3 }
        );
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.csv", "");

        assert!(matches!(read_headers_and_preview(&path), Err(StoreError::EmptyImportFile(_))));
    }

    #[test]
    fn test_import_skips_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "p.csv", PRODUCTS);
        let mut catalog = Catalog::new();
        let mapping = ColumnMapping { reference: 0, description: 1, barcode: 2, price: 3 };

        let report = import_csv(&path, &mapping, &mut catalog).unwrap();
        // Five data rows, C3 has a bad price and D4 is too short.
        assert_eq!(report.imported, 3);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.find_by_code("8410001").unwrap().price.cents(), 120);
        assert!(catalog.find_by_reference("B2").unwrap().barcode.is_none());
    }

    #[test]
    fn test_conflicting_mapping_imports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "p.csv", PRODUCTS);
        let mut catalog = Catalog::new();
        let mapping = ColumnMapping { reference: 0, description: 1, barcode: 2, price: 2 };

        let err = import_csv(&path, &mapping, &mut catalog).unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::MappingConflict { .. })));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_missing_file_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = Catalog::new();
        let mapping = ColumnMapping { reference: 0, description: 1, barcode: 2, price: 3 };

        let result = import_csv(&dir.path().join("nope.csv"), &mapping, &mut catalog);
        assert!(matches!(result, Err(StoreError::Csv(_))));
    }

    #[test]
    fn test_export_quantities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cierre.csv");
        let summary = CloseSummary {
            quantities: vec![
                ProductQuantity { reference: "A1".to_string(), quantity: 3 },
                ProductQuantity { reference: "B2".to_string(), quantity: 12 },
            ],
            ..CloseSummary::default()
        };

        assert_eq!(export_quantities(&path, &summary).unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "reference,quantity\nA1,3\nB2,12\n");
    }
}
