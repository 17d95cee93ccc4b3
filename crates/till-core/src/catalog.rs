//! # Catalog
//!
//! The append-only list of known products.
//!
//! ## Lookup Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  find_by_code("8410001")        first product whose barcode OR         │
//! │                                 reference equals the code, ignoring    │
//! │                                 case                                   │
//! │                                                                         │
//! │  search("agua", Description)    every product whose description        │
//! │                                 contains "agua", ignoring case         │
//! │                                                                         │
//! │  search("", _)                  the whole catalog, insertion order     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Duplicate references are tolerated; the earliest product wins every lookup.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::types::Product;

// =============================================================================
// Search Field
// =============================================================================

/// Which product field a search looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchField {
    #[default]
    All,
    Reference,
    Description,
    Barcode,
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchField::All => "all",
            SearchField::Reference => "reference",
            SearchField::Description => "description",
            SearchField::Barcode => "barcode",
        };
        f.write_str(name)
    }
}

impl FromStr for SearchField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(SearchField::All),
            "reference" | "ref" => Ok(SearchField::Reference),
            "description" | "desc" => Ok(SearchField::Description),
            "barcode" | "code" => Ok(SearchField::Barcode),
            other => Err(ValidationError::InvalidFormat {
                field: "search field".to_string(),
                reason: format!("unknown field '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Owns every product. Cart lines hold `Arc` clones of these records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Arc<Product>>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Appends a product and returns the shared handle to it.
    ///
    /// No uniqueness check: see [`Catalog::contains_reference`].
    pub fn add(&mut self, product: Product) -> Arc<Product> {
        let product = Arc::new(product);
        self.products.push(Arc::clone(&product));
        product
    }

    /// Returns true when some product already uses `reference` (case-insensitive).
    pub fn contains_reference(&self, reference: &str) -> bool {
        self.find_by_reference(reference).is_some()
    }

    /// First product whose reference equals `reference`, ignoring case.
    pub fn find_by_reference(&self, reference: &str) -> Option<&Arc<Product>> {
        let reference = reference.trim().to_lowercase();
        self.products
            .iter()
            .find(|p| p.reference.to_lowercase() == reference)
    }

    /// First product whose barcode or reference equals `code`, ignoring case.
    ///
    /// Blank codes never match, so a product without a barcode is not
    /// found by scanning an empty string.
    pub fn find_by_code(&self, code: &str) -> Option<&Arc<Product>> {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            return None;
        }

        self.products.iter().find(|p| {
            p.reference.to_lowercase() == code
                || p.barcode.as_deref().is_some_and(|b| b.to_lowercase() == code)
        })
    }

    /// Lazily yields products whose `field` contains `query`, ignoring case.
    ///
    /// The returned iterator is `Clone`, so a caller can restart it without
    /// searching again.
    pub fn search<'a>(&'a self, query: &str, field: SearchField) -> Search<'a> {
        Search {
            inner: self.products.iter(),
            query: query.trim().to_lowercase(),
            field,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Product>> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        Catalog {
            products: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

// =============================================================================
// Search Iterator
// =============================================================================

/// Iterator returned by [`Catalog::search`].
#[derive(Debug, Clone)]
pub struct Search<'a> {
    inner: std::slice::Iter<'a, Arc<Product>>,
    query: String,
    field: SearchField,
}

impl Search<'_> {
    fn matches(&self, product: &Product) -> bool {
        if self.query.is_empty() {
            return true;
        }

        let contains = |value: &str| value.to_lowercase().contains(&self.query);
        match self.field {
            SearchField::All => {
                contains(&product.reference)
                    || contains(&product.description)
                    || contains(product.barcode_or_empty())
            }
            SearchField::Reference => contains(&product.reference),
            SearchField::Description => contains(&product.description),
            SearchField::Barcode => contains(product.barcode_or_empty()),
        }
    }
}

impl<'a> Iterator for Search<'a> {
    type Item = &'a Arc<Product>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(product) = self.inner.next() {
            if self.matches(product) {
                return Some(product);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product(reference: &str, description: &str, barcode: &str, cents: i64) -> Product {
        Product::new(reference, description, barcode, Money::from_cents(cents)).unwrap()
    }

    fn sample_catalog() -> Catalog {
        [
            product("A1", "Agua mineral", "8410001", 100),
            product("B2", "Pan de molde", "8410002", 250),
            product("C3", "Aceite", "", 599),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_find_by_code_matches_barcode_or_reference() {
        let catalog = sample_catalog();

        assert_eq!(catalog.find_by_code("8410002").unwrap().reference, "B2");
        assert_eq!(catalog.find_by_code("a1").unwrap().reference, "A1");
        assert_eq!(catalog.find_by_code("  c3 ").unwrap().reference, "C3");
        assert!(catalog.find_by_code("Z9").is_none());
        assert!(catalog.find_by_code("").is_none());
    }

    #[test]
    fn test_duplicate_reference_first_wins() {
        let mut catalog = sample_catalog();
        catalog.add(product("A1", "Agua con gas", "999", 120));

        assert_eq!(catalog.len(), 4);
        assert!(catalog.contains_reference("a1"));
        assert_eq!(catalog.find_by_code("A1").unwrap().description, "Agua mineral");
        assert_eq!(catalog.find_by_reference("A1").unwrap().price.cents(), 100);
    }

    #[test]
    fn test_search_empty_query_yields_everything_in_order() {
        let catalog = sample_catalog();
        let refs: Vec<_> = catalog
            .search("", SearchField::All)
            .map(|p| p.reference.as_str())
            .collect();
        assert_eq!(refs, ["A1", "B2", "C3"]);
    }

    #[test]
    fn test_search_by_field() {
        let catalog = sample_catalog();

        let hits: Vec<_> = catalog.search("ACE", SearchField::Description).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].reference, "C3");

        assert_eq!(catalog.search("841", SearchField::Barcode).count(), 2);
        assert_eq!(catalog.search("841", SearchField::Reference).count(), 0);
        assert_eq!(catalog.search("a", SearchField::All).count(), 3);
    }

    #[test]
    fn test_search_is_restartable() {
        let catalog = sample_catalog();
        let search = catalog.search("8410", SearchField::All);

        let first: Vec<_> = search.clone().collect();
        let second: Vec<_> = search.collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_search_field_parsing() {
        assert_eq!("all".parse::<SearchField>().unwrap(), SearchField::All);
        assert_eq!("Barcode".parse::<SearchField>().unwrap(), SearchField::Barcode);
        assert_eq!("desc".parse::<SearchField>().unwrap(), SearchField::Description);
        assert!("price".parse::<SearchField>().is_err());
    }
}
