//! # Cart
//!
//! The in-progress sale: an ordered list of lines the cashier builds up
//! before charging.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action           Cart Method            State Change           │
//! │  ──────────────           ───────────            ────────────           │
//! │                                                                         │
//! │  Scan / pick product ───► add_line() ──────────► lines.push(line)      │
//! │                                                                         │
//! │  Double-click a line ───► edit_line(i, ..) ────► lines[i] = new line   │
//! │                                                                         │
//! │  Click Remove ──────────► remove_line(i) ──────► lines.remove(i)       │
//! │                                                                         │
//! │  Charge (finalize) ─────► take_lines() ────────► lines.clear()         │
//! │                                                                         │
//! │  NOTE: every method validates first and mutates last, so an error      │
//! │        leaves the cart exactly as it was.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unlike a grocery basket, adding the same product twice creates two
//! lines: each line may carry its own price override and discount.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Discount, Product, TaxRate};
use crate::validation::{validate_price, validate_quantity};

// =============================================================================
// Sale Line
// =============================================================================

/// One line of a sale.
///
/// ## Design Notes
/// - `product`: shared with the catalog, never copied or mutated
/// - `unit_price`: starts at the product price, may be overridden per line
/// - `discount`: percentage off the line, 0%..=100%
/// - `line_total`: computed once, so it always fits in a `Money`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    product: Arc<Product>,
    quantity: i64,
    unit_price: Money,
    discount: Discount,
    line_total: Money,
}

impl SaleLine {
    /// Creates a validated line.
    ///
    /// ## Errors
    /// - quantity below 1
    /// - negative unit price
    /// - `quantity × unit_price` beyond the money range
    pub fn new(
        product: Arc<Product>,
        quantity: i64,
        unit_price: Money,
        discount: Discount,
    ) -> Result<Self, ValidationError> {
        validate_quantity(quantity)?;
        validate_price(unit_price)?;
        let gross = unit_price
            .checked_mul(quantity)
            .ok_or_else(|| ValidationError::AmountTooLarge {
                field: "line total".to_string(),
            })?;

        Ok(SaleLine {
            product,
            quantity,
            unit_price,
            discount,
            line_total: gross.apply_discount(discount),
        })
    }

    pub fn product(&self) -> &Arc<Product> {
        &self.product
    }

    pub fn reference(&self) -> &str {
        &self.product.reference
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn discount(&self) -> Discount {
        self.discount
    }

    /// `quantity × unit_price × (1 − discount/100)`, rounded to the cent.
    ///
    /// ## Example
    /// ```text
    /// 3 × $10.00 = $30.00 gross
    /// 10% discount = $3.00
    /// line total   = $27.00
    /// ```
    pub fn line_total(&self) -> Money {
        self.line_total
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Subtotal, tax and total of one ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Computes totals for a set of lines at one tax rate.
    ///
    /// Tax is taken once on the subtotal, never line by line.
    pub fn compute(lines: &[SaleLine], tax_rate: TaxRate) -> Self {
        let subtotal: Money = lines.iter().map(SaleLine::line_total).sum();
        let tax = subtotal.calculate_tax(tax_rate);
        SaleTotals {
            subtotal,
            tax_rate,
            tax,
            total: subtotal + tax,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Line order is insertion order (user-visible positions are 1-based in the UI)
/// - Every line has quantity ≥ 1, price ≥ 0 and discount in 0..=100
/// - The subtotal of all lines fits in a `Money`
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<SaleLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Appends a line for `product`.
    ///
    /// `price_override` replaces the catalog price for this line only.
    pub fn add_line(
        &mut self,
        product: Arc<Product>,
        quantity: i64,
        price_override: Option<Money>,
        discount: Discount,
    ) -> CoreResult<&SaleLine> {
        let unit_price = price_override.unwrap_or(product.price);
        let line = SaleLine::new(product, quantity, unit_price, discount)?;
        self.check_subtotal(None, &line)?;

        self.lines.push(line);
        let index = self.lines.len() - 1;
        Ok(&self.lines[index])
    }

    /// Replaces quantity, price and discount of the line at `index` (0-based).
    ///
    /// The product stays the same.
    pub fn edit_line(
        &mut self,
        index: usize,
        quantity: i64,
        unit_price: Money,
        discount: Discount,
    ) -> CoreResult<&SaleLine> {
        let current = self.line(index)?;
        let replacement = SaleLine::new(Arc::clone(&current.product), quantity, unit_price, discount)?;
        self.check_subtotal(Some(index), &replacement)?;

        self.lines[index] = replacement;
        Ok(&self.lines[index])
    }

    /// Fails if `line`, together with every line except `replacing`,
    /// would push the subtotal past the money range.
    fn check_subtotal(&self, replacing: Option<usize>, line: &SaleLine) -> Result<(), ValidationError> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != replacing)
            .try_fold(line.line_total(), |acc, (_, l)| acc.checked_add(l.line_total()))
            .map(|_| ())
            .ok_or_else(|| ValidationError::AmountTooLarge {
                field: "subtotal".to_string(),
            })
    }

    /// Removes and returns the line at `index` (0-based).
    pub fn remove_line(&mut self, index: usize) -> CoreResult<SaleLine> {
        self.line(index)?;
        Ok(self.lines.remove(index))
    }

    /// Returns the line at `index` (0-based).
    pub fn line(&self, index: usize) -> CoreResult<&SaleLine> {
        self.lines.get(index).ok_or(CoreError::LineOutOfRange {
            index,
            len: self.lines.len(),
        })
    }

    pub fn lines(&self) -> &[SaleLine] {
        &self.lines
    }

    /// Moves every line out, leaving the cart empty.
    pub fn take_lines(&mut self) -> Vec<SaleLine> {
        std::mem::take(&mut self.lines)
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line totals (before tax).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(SaleLine::line_total).sum()
    }

    /// Totals as they would be charged at `tax_rate`.
    pub fn totals(&self, tax_rate: TaxRate) -> SaleTotals {
        SaleTotals::compute(&self.lines, tax_rate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(reference: &str, cents: i64) -> Arc<Product> {
        Arc::new(Product::new(reference, format!("Product {}", reference), "", Money::from_cents(cents)).unwrap())
    }

    #[test]
    fn test_line_total_with_discount() {
        let line = SaleLine::new(product("A1", 1000), 3, Money::from_cents(1000), Discount::from_bps(1000)).unwrap();
        assert_eq!(line.line_total().cents(), 2700);
    }

    #[test]
    fn test_line_total_matches_formula_across_inputs() {
        for (qty, cents, bps) in [(1, 0, 0), (7, 333, 1250), (2, 99, 3333), (5, 1999, 10000), (12, 45, 50)] {
            let line = SaleLine::new(product("X", cents), qty, Money::from_cents(cents), Discount::from_bps(bps)).unwrap();
            let gross = (qty * cents) as i128;
            let off = (gross * bps as i128 + 5000) / 10000;
            assert_eq!(line.line_total().cents() as i128, gross - off);
            assert!(!line.line_total().is_negative());
        }
    }

    #[test]
    fn test_add_line_uses_catalog_price_by_default() {
        let mut cart = Cart::new();
        let line = cart.add_line(product("A1", 999), 2, None, Discount::none()).unwrap();

        assert_eq!(line.unit_price().cents(), 999);
        assert_eq!(cart.subtotal().cents(), 1998);
    }

    #[test]
    fn test_add_line_with_price_override() {
        let mut cart = Cart::new();
        cart.add_line(product("A1", 999), 1, Some(Money::from_cents(500)), Discount::none()).unwrap();

        assert_eq!(cart.lines()[0].unit_price().cents(), 500);
        assert_eq!(cart.lines()[0].product().price.cents(), 999);
    }

    #[test]
    fn test_same_product_twice_makes_two_lines() {
        let mut cart = Cart::new();
        let water = product("A1", 100);
        cart.add_line(Arc::clone(&water), 1, None, Discount::none()).unwrap();
        cart.add_line(water, 2, None, Discount::from_bps(5000)).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal().cents(), 200);
    }

    #[test]
    fn test_invalid_input_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add_line(product("A1", 100), 1, None, Discount::none()).unwrap();

        assert!(matches!(
            cart.add_line(product("B2", 100), 0, None, Discount::none()),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(cart.add_line(product("B2", 100), 1, Some(Money::from_cents(-1)), Discount::none()).is_err());
        assert!(cart.edit_line(0, -3, Money::from_cents(100), Discount::none()).is_err());

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity(), 1);
    }

    #[test]
    fn test_overflowing_line_is_rejected() {
        let mut cart = Cart::new();
        let result = cart.add_line(
            product("A1", 1000),
            10_000_000_000_000_000,
            Some(Money::from_cents(1000)),
            Discount::none(),
        );

        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::AmountTooLarge { .. }))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_largest_line_that_fits_is_accepted() {
        let mut cart = Cart::new();
        let line = cart.add_line(product("A1", 1), i64::MAX, None, Discount::none()).unwrap();

        assert_eq!(line.line_total().cents(), i64::MAX);
        assert!(!cart.totals(TaxRate::from_bps(2100)).total.is_negative());
    }

    #[test]
    fn test_subtotal_past_the_limit_is_rejected() {
        let mut cart = Cart::new();
        let half = i64::MAX / 2 + 1;
        cart.add_line(product("A1", half), 1, None, Discount::none()).unwrap();
        cart.add_line(product("B2", 1), 1, None, Discount::none()).unwrap();

        assert!(cart.add_line(product("C3", half), 1, None, Discount::none()).is_err());
        assert!(cart.edit_line(1, 1, Money::from_cents(half), Discount::none()).is_err());
        // replacing a line only counts the new value
        cart.edit_line(0, 1, Money::from_cents(half - 1), Discount::none()).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal().cents(), half);
    }

    #[test]
    fn test_edit_line_keeps_product() {
        let mut cart = Cart::new();
        cart.add_line(product("A1", 1000), 1, None, Discount::none()).unwrap();
        cart.add_line(product("B2", 200), 1, None, Discount::none()).unwrap();

        let edited = cart.edit_line(1, 4, Money::from_cents(150), Discount::from_bps(2500)).unwrap();
        assert_eq!(edited.reference(), "B2");
        assert_eq!(edited.line_total().cents(), 450);
        assert_eq!(cart.lines()[0].reference(), "A1");
    }

    #[test]
    fn test_edit_and_remove_out_of_range() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.edit_line(0, 1, Money::zero(), Discount::none()),
            Err(CoreError::LineOutOfRange { index: 0, len: 0 })
        ));
        assert!(matches!(cart.remove_line(3), Err(CoreError::LineOutOfRange { .. })));
    }

    #[test]
    fn test_remove_line_preserves_order() {
        let mut cart = Cart::new();
        for r in ["A1", "B2", "C3"] {
            cart.add_line(product(r, 100), 1, None, Discount::none()).unwrap();
        }

        let removed = cart.remove_line(1).unwrap();
        assert_eq!(removed.reference(), "B2");
        let refs: Vec<_> = cart.lines().iter().map(SaleLine::reference).collect();
        assert_eq!(refs, ["A1", "C3"]);
    }

    #[test]
    fn test_totals_at_tax_rate() {
        let mut cart = Cart::new();
        cart.add_line(product("A1", 1000), 3, None, Discount::from_bps(1000)).unwrap();

        let totals = cart.totals(TaxRate::from_bps(2100));
        assert_eq!(totals.subtotal.cents(), 2700);
        assert_eq!(totals.tax.cents(), 567);
        assert_eq!(totals.total.cents(), 3267);
    }

    #[test]
    fn test_take_lines_empties_cart() {
        let mut cart = Cart::new();
        cart.add_line(product("A1", 1000), 1, None, Discount::none()).unwrap();

        let lines = cart.take_lines();
        assert_eq!(lines.len(), 1);
        assert!(cart.is_empty());
    }
}
