//! # CSV Import Mapper
//!
//! Turns rows of a CSV with an unknown column layout into catalog products,
//! using a column mapping the user picked.
//!
//! ## Import Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  headers ──► ColumnMapping::propose()   (i-th field → i-th column)      │
//! │                     │                                                   │
//! │                     ▼  user adjusts                                     │
//! │              ColumnMapping::validate()  ── two fields, one column? ──►  │
//! │                     │                     MappingConflict (0 imported)  │
//! │                     ▼                                                   │
//! │  for each row:  cell(reference) cell(description) cell(barcode)         │
//! │                 cell(price) ── "3,50" → "3.50" → 350 cents              │
//! │                     │                                                   │
//! │                     ├── missing cell / bad price ──► skip row, go on    │
//! │                     │                                                   │
//! │                     └── ok ──► catalog.add(product)  (no rollback)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::parse::parse_price;
use crate::types::Product;

// =============================================================================
// Mapped Field
// =============================================================================

/// The four product fields every import must fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappedField {
    Reference,
    Description,
    Barcode,
    Price,
}

impl MappedField {
    /// All fields, in the order [`ColumnMapping::propose`] assigns them.
    pub const ALL: [MappedField; 4] = [
        MappedField::Reference,
        MappedField::Description,
        MappedField::Barcode,
        MappedField::Price,
    ];
}

impl fmt::Display for MappedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MappedField::Reference => "reference",
            MappedField::Description => "description",
            MappedField::Barcode => "barcode",
            MappedField::Price => "price",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Row Access
// =============================================================================

/// Anything an import can read cells from by column index.
pub trait Row {
    fn cell(&self, index: usize) -> Option<&str>;
}

impl<S: AsRef<str>> Row for [S] {
    fn cell(&self, index: usize) -> Option<&str> {
        self.get(index).map(AsRef::as_ref)
    }
}

impl<S: AsRef<str>> Row for Vec<S> {
    fn cell(&self, index: usize) -> Option<&str> {
        self.as_slice().cell(index)
    }
}

impl<R: Row + ?Sized> Row for &R {
    fn cell(&self, index: usize) -> Option<&str> {
        (**self).cell(index)
    }
}

// =============================================================================
// Column Mapping
// =============================================================================

/// Which source column feeds each product field (0-based indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub reference: usize,
    pub description: usize,
    pub barcode: usize,
    pub price: usize,
}

impl ColumnMapping {
    /// Default mapping: the i-th field takes the i-th header, clamped to the
    /// last available column.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::import::ColumnMapping;
    ///
    /// let m = ColumnMapping::propose(&["ref", "name", "ean", "pvp", "stock"]);
    /// assert_eq!((m.reference, m.description, m.barcode, m.price), (0, 1, 2, 3));
    ///
    /// let narrow = ColumnMapping::propose(&["ref", "name"]);
    /// assert_eq!((narrow.barcode, narrow.price), (1, 1));
    /// ```
    pub fn propose<S: AsRef<str>>(headers: &[S]) -> Self {
        let last = headers.len().saturating_sub(1);
        ColumnMapping {
            reference: 0.min(last),
            description: 1.min(last),
            barcode: 2.min(last),
            price: 3.min(last),
        }
    }

    /// Builds a mapping from header names, e.g. `["sku", "name", "ean", "pvp"]`
    /// in reference, description, barcode, price order.
    pub fn from_header_names<S: AsRef<str>>(headers: &[S], names: [&str; 4]) -> CoreResult<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref().trim() == name.trim())
                .ok_or_else(|| CoreError::UnknownColumn(name.to_string()))
        };

        let mapping = ColumnMapping {
            reference: position(names[0])?,
            description: position(names[1])?,
            barcode: position(names[2])?,
            price: position(names[3])?,
        };
        mapping.validate()?;
        Ok(mapping)
    }

    /// The column assigned to `field`.
    pub fn column(&self, field: MappedField) -> usize {
        match field {
            MappedField::Reference => self.reference,
            MappedField::Description => self.description,
            MappedField::Barcode => self.barcode,
            MappedField::Price => self.price,
        }
    }

    /// Fails with [`CoreError::MappingConflict`] when two fields share a column.
    pub fn validate(&self) -> CoreResult<()> {
        for (i, &first) in MappedField::ALL.iter().enumerate() {
            for &second in &MappedField::ALL[i + 1..] {
                if self.column(first) == self.column(second) {
                    return Err(CoreError::MappingConflict {
                        first,
                        second,
                        column: self.column(first),
                    });
                }
            }
        }
        Ok(())
    }

    /// Extracts one product from `row`.
    fn product_from<R: Row + ?Sized>(&self, row: &R) -> Result<Product, RowSkipReason> {
        let cell = |field: MappedField| {
            row.cell(self.column(field))
                .map(str::trim)
                .ok_or(RowSkipReason::MissingColumn(field))
        };

        let reference = cell(MappedField::Reference)?;
        let description = cell(MappedField::Description)?;
        let barcode = cell(MappedField::Barcode)?;
        let raw_price = cell(MappedField::Price)?;

        let price = parse_price(&raw_price.replace(',', "."))
            .ok_or_else(|| RowSkipReason::InvalidPrice(raw_price.to_string()))?;

        Product::new(reference, description, barcode, price)
            .map_err(|_| RowSkipReason::InvalidPrice(raw_price.to_string()))
    }
}

// =============================================================================
// Import Report
// =============================================================================

/// Why a row was left out of the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSkipReason {
    /// The row is shorter than the mapped column for this field.
    MissingColumn(MappedField),
    /// The price cell is not a non-negative number.
    InvalidPrice(String),
}

impl fmt::Display for RowSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSkipReason::MissingColumn(field) => write!(f, "no column for {}", field),
            RowSkipReason::InvalidPrice(raw) => write!(f, "invalid price '{}'", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based position among the data rows (the header is not counted).
    pub row: usize,
    pub reason: RowSkipReason,
}

/// Outcome of one import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Products appended to the catalog.
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
    /// Imported products whose reference was already in the catalog.
    pub duplicates: usize,
}

/// Imports `rows` into `catalog` with `mapping`.
///
/// ## Behavior
/// - The mapping is validated before any row is read
/// - Bad rows are recorded in the report and skipped
/// - Good rows are appended immediately; nothing is rolled back
///
/// ## Example
/// ```rust
/// use till_core::catalog::Catalog;
/// use till_core::import::{import_rows, ColumnMapping};
///
/// let rows = vec![
///     vec!["A1", "Agua", "8410001", "1,20"],
///     vec!["B2", "Pan", "", "abc"],
/// ];
/// let mut catalog = Catalog::new();
/// let mapping = ColumnMapping { reference: 0, description: 1, barcode: 2, price: 3 };
///
/// let report = import_rows(&rows, &mapping, &mut catalog).unwrap();
/// assert_eq!(report.imported, 1);
/// assert_eq!(report.skipped.len(), 1);
/// assert_eq!(catalog.len(), 1);
/// ```
pub fn import_rows<I>(rows: I, mapping: &ColumnMapping, catalog: &mut Catalog) -> CoreResult<ImportReport>
where
    I: IntoIterator,
    I::Item: Row,
{
    mapping.validate()?;

    let mut report = ImportReport::default();
    for (i, row) in rows.into_iter().enumerate() {
        match mapping.product_from(&row) {
            Ok(product) => {
                if catalog.contains_reference(&product.reference) {
                    report.duplicates += 1;
                }
                catalog.add(product);
                report.imported += 1;
            }
            Err(reason) => report.skipped.push(SkippedRow { row: i + 1, reason }),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPING: ColumnMapping = ColumnMapping {
        reference: 0,
        description: 1,
        barcode: 2,
        price: 3,
    };

    #[test]
    fn test_propose_mapping() {
        let m = ColumnMapping::propose(&["a", "b", "c", "d"]);
        assert_eq!(m, MAPPING);
        assert!(m.validate().is_ok());

        let single = ColumnMapping::propose(&["only"]);
        assert_eq!(single.price, 0);
        assert!(single.validate().is_err());

        let none: [&str; 0] = [];
        assert_eq!(ColumnMapping::propose(&none).reference, 0);
    }

    #[test]
    fn test_validate_detects_shared_column() {
        let mapping = ColumnMapping {
            reference: 0,
            description: 1,
            barcode: 2,
            price: 2,
        };
        match mapping.validate() {
            Err(CoreError::MappingConflict { first, second, column }) => {
                assert_eq!(first, MappedField::Barcode);
                assert_eq!(second, MappedField::Price);
                assert_eq!(column, 2);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_mapping_imports_nothing() {
        let mut catalog = Catalog::new();
        let rows = vec![vec!["A1", "Agua", "8410001", "1.00"]];
        let mapping = ColumnMapping {
            price: 2,
            ..MAPPING
        };

        assert!(import_rows(&rows, &mapping, &mut catalog).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_prices_are_skipped() {
        let rows = vec![
            vec!["A1", "Agua", "8410001", "1.00"],
            vec!["B2", "Pan", "8410002", "dos"],
            vec!["C3", "Aceite", "", "5,99"],
            vec!["D4", "Sal", "", ""],
            vec!["E5", "Azucar", "", "-2"],
            vec!["F6", "Cafe", "", " 3.5 "],
        ];
        let mut catalog = Catalog::new();

        let report = import_rows(&rows, &MAPPING, &mut catalog).unwrap();
        assert_eq!(report.imported, 3);
        assert_eq!(catalog.len(), rows.len() - 3);
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.row).collect();
        assert_eq!(skipped, [2, 4, 5]);
        assert_eq!(catalog.find_by_code("C3").unwrap().price.cents(), 599);
        assert_eq!(catalog.find_by_code("F6").unwrap().price.cents(), 350);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let rows = vec![vec!["A1", "Agua"], vec!["B2", "Pan", "8410002", "2"]];
        let mut catalog = Catalog::new();

        let report = import_rows(&rows, &MAPPING, &mut catalog).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(
            report.skipped[0].reason,
            RowSkipReason::MissingColumn(MappedField::Barcode)
        );
    }

    #[test]
    fn test_cells_are_trimmed_and_reordered() {
        let rows = vec![vec![" 2,50 ", " 8410009 ", "  Leche  ", " L1 "]];
        let mapping = ColumnMapping {
            reference: 3,
            description: 2,
            barcode: 1,
            price: 0,
        };
        let mut catalog = Catalog::new();
        import_rows(&rows, &mapping, &mut catalog).unwrap();

        let milk = catalog.find_by_code("8410009").unwrap();
        assert_eq!(milk.reference, "L1");
        assert_eq!(milk.description, "Leche");
        assert_eq!(milk.price.cents(), 250);
    }

    #[test]
    fn test_duplicates_are_appended_and_counted() {
        let mut catalog = Catalog::new();
        let rows = vec![
            vec!["A1", "Agua", "", "1"],
            vec!["A1", "Agua grande", "", "2"],
        ];

        let report = import_rows(&rows, &MAPPING, &mut catalog).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(catalog.find_by_code("A1").unwrap().description, "Agua");
    }

    #[test]
    fn test_from_header_names() {
        let headers = ["pvp", "sku", "ean", "nombre"];
        let mapping = ColumnMapping::from_header_names(&headers, ["sku", "nombre", "ean", "pvp"]).unwrap();
        assert_eq!(mapping.reference, 1);
        assert_eq!(mapping.description, 3);
        assert_eq!(mapping.price, 0);

        assert!(matches!(
            ColumnMapping::from_header_names(&headers, ["sku", "nombre", "ean", "precio"]),
            Err(CoreError::UnknownColumn(_))
        ));
        assert!(matches!(
            ColumnMapping::from_header_names(&headers, ["sku", "nombre", "ean", "ean"]),
            Err(CoreError::MappingConflict { .. })
        ));
    }
}
