//! # Session Aggregator
//!
//! Reduces a session's finalized sales into the close-of-day summary.
//!
//! ```text
//! sales ──► for each sale:  subtotal = Σ line_total
//!                           tax      = subtotal × sale.tax_rate   (per sale!)
//!       ──► base_total  = Σ subtotal
//!           tax_total   = Σ tax
//!           grand_total = base_total + tax_total
//!           quantities  = reference → Σ quantity, first-seen order
//! ```
//!
//! Every sum saturates at the top of its range rather than wrapping.
//!
//! Tax belongs to the sale, not the session: a rate change mid-day only
//! affects sales charged after it.

use std::collections::HashMap;

use crate::money::Money;
use crate::session::FinalizedSale;

/// Units sold of one reference during the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuantity {
    pub reference: String,
    pub quantity: i64,
}

/// The close-of-day figures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseSummary {
    /// Per-reference quantities in order of first appearance.
    pub quantities: Vec<ProductQuantity>,
    pub sale_count: usize,
    pub base_total: Money,
    pub tax_total: Money,
    pub grand_total: Money,
}

impl CloseSummary {
    /// Units sold of `reference`, if it appeared in any sale.
    pub fn quantity_of(&self, reference: &str) -> Option<i64> {
        self.quantities
            .iter()
            .find(|q| q.reference == reference)
            .map(|q| q.quantity)
    }
}

/// Aggregates `sales` into a [`CloseSummary`]. Pure; `sales` is not consumed.
pub fn summarize(sales: &[FinalizedSale]) -> CloseSummary {
    let mut quantities: Vec<ProductQuantity> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut base_total = Money::zero();
    let mut tax_total = Money::zero();

    for sale in sales {
        for line in sale.lines() {
            match positions.get(line.reference()) {
                Some(&pos) => {
                    let entry = &mut quantities[pos];
                    entry.quantity = entry.quantity.saturating_add(line.quantity());
                }
                None => {
                    positions.insert(line.reference(), quantities.len());
                    quantities.push(ProductQuantity {
                        reference: line.reference().to_string(),
                        quantity: line.quantity(),
                    });
                }
            }
        }

        let totals = sale.totals();
        base_total += totals.subtotal;
        tax_total += totals.tax;
    }

    CloseSummary {
        quantities,
        sale_count: sales.len(),
        base_total,
        tax_total,
        grand_total: base_total + tax_total,
    }
}
