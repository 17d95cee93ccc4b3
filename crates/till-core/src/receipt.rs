//! # Receipt Formatter
//!
//! Renders sales and close summaries into the canonical receipt text that
//! gets stored and printed.
//!
//! ## Sale Receipt Layout
//! ```text
//! ┌──────────────────────────────────────┐
//! │ *** Punto de venta ***               │  ◄── template header
//! │ 02/03/2026 09:30                     │  ◄── timestamp (caller supplied)
//! │                                      │
//! │ A1 x3 @ $10.00 (-10.00%)             │  ◄── discount only when non-zero
//! │   Agua mineral                       │
//! │                                      │
//! │ Base: $27.00                         │
//! │ IVA 21.00%: $5.67                    │
//! │ TOTAL: $32.67                        │
//! │                                      │
//! │ ¡Gracias por su compra!              │  ◄── omitted when footer is empty
//! └──────────────────────────────────────┘
//! ```
//!
//! Formatting is pure: identical inputs and timestamp give identical text.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cart::{SaleLine, SaleTotals};
use crate::money::Money;
use crate::parse::parse_fixed;
use crate::session::FinalizedSale;
use crate::summary::CloseSummary;
use crate::types::TaxRate;

/// Timestamp layout printed under the header.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Title line of the close-of-day receipt.
pub const CLOSE_TITLE: &str = "*** Cierre de caja ***";

/// Header and footer printed around every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptTemplate {
    pub header: String,
    pub footer: String,
}

impl Default for ReceiptTemplate {
    fn default() -> Self {
        ReceiptTemplate {
            header: "*** Punto de venta ***".to_string(),
            footer: "¡Gracias por su compra!".to_string(),
        }
    }
}

impl ReceiptTemplate {
    fn push_header(&self, lines: &mut Vec<String>, timestamp: NaiveDateTime) {
        lines.push(self.header.clone());
        lines.push(timestamp.format(TIMESTAMP_FORMAT).to_string());
        lines.push(String::new());
    }

    fn push_footer(&self, lines: &mut Vec<String>) {
        if !self.footer.is_empty() {
            lines.push(String::new());
            lines.push(self.footer.clone());
        }
    }

    /// Renders a finalized sale at its own recorded tax rate.
    pub fn format_sale(&self, sale: &FinalizedSale, timestamp: NaiveDateTime) -> String {
        self.format_lines(sale.lines(), sale.tax_rate(), timestamp)
    }

    /// Renders arbitrary lines at `tax_rate`.
    pub fn format_lines(&self, sale_lines: &[SaleLine], tax_rate: TaxRate, timestamp: NaiveDateTime) -> String {
        let mut lines = Vec::with_capacity(sale_lines.len() * 2 + 10);
        self.push_header(&mut lines, timestamp);

        for line in sale_lines {
            let discount = if line.discount().is_zero() {
                String::new()
            } else {
                format!(" (-{}%)", line.discount())
            };
            lines.push(format!(
                "{} x{} @ {}{}",
                line.reference(),
                line.quantity(),
                line.unit_price(),
                discount
            ));
            lines.push(format!("  {}", line.product().description));
        }

        let totals = SaleTotals::compute(sale_lines, tax_rate);
        lines.push(String::new());
        lines.push(format!("Base: {}", totals.subtotal));
        lines.push(format!("IVA {}%: {}", totals.tax_rate, totals.tax));
        lines.push(format!("TOTAL: {}", totals.total));

        self.push_footer(&mut lines);
        lines.join("\n")
    }

    /// Renders the close-of-day summary.
    ///
    /// ```text
    /// *** Punto de venta ***
    /// *** Cierre de caja ***
    /// 02/03/2026 21:00
    ///
    /// A1: 3 uds
    ///
    /// Base imponible: $27.00
    /// IVA acumulado: $5.67
    /// Total caja: $32.67
    /// ```
    pub fn format_close(&self, summary: &CloseSummary, timestamp: NaiveDateTime) -> String {
        let mut lines = Vec::with_capacity(summary.quantities.len() + 12);
        lines.push(self.header.clone());
        lines.push(CLOSE_TITLE.to_string());
        lines.push(timestamp.format(TIMESTAMP_FORMAT).to_string());
        lines.push(String::new());

        for q in &summary.quantities {
            lines.push(format!("{}: {} uds", q.reference, q.quantity));
        }

        lines.push(String::new());
        lines.push(format!("Base imponible: {}", summary.base_total));
        lines.push(format!("IVA acumulado: {}", summary.tax_total));
        lines.push(format!("Total caja: {}", summary.grand_total));

        self.push_footer(&mut lines);
        lines.join("\n")
    }
}

// =============================================================================
// Reading Totals Back
// =============================================================================

/// Totals recovered from a sale receipt's Base / IVA / TOTAL lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

/// Parses a receipt amount such as `$1,234.56` or `-$5.50`.
fn parse_amount(text: &str) -> Option<Money> {
    let text = text.trim();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits: String = rest.strip_prefix('$')?.chars().filter(|&c| c != ',').collect();
    let cents = parse_fixed(&digits)?;
    Some(Money::from_cents(if negative { -cents } else { cents }))
}

/// Reads the totals block of a sale receipt.
///
/// The block is the first run of consecutive `Base`, `IVA` and `TOTAL`
/// lines, so header or footer text that looks like a total is ignored.
/// Returns `None` when no such block is found.
pub fn parse_sale_totals(text: &str) -> Option<ReceiptTotals> {
    let lines: Vec<&str> = text.lines().collect();
    lines.windows(3).find_map(|block| {
        let subtotal = parse_amount(block[0].strip_prefix("Base: ")?)?;
        let (_, tax) = block[1].strip_prefix("IVA ")?.split_once("%: ")?;
        let tax = parse_amount(tax)?;
        let total = parse_amount(block[2].strip_prefix("TOTAL: ")?)?;
        Some(ReceiptTotals { subtotal, tax, total })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::session::CashSession;
    use crate::summary::summarize;
    use crate::types::{Discount, Product};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn finalized(lines: &[(&str, &str, i64, i64, u32)], rate_bps: u32) -> FinalizedSale {
        let mut cart = Cart::new();
        for &(reference, description, cents, qty, disc) in lines {
            let product = Arc::new(Product::new(reference, description, "", Money::from_cents(cents)).unwrap());
            cart.add_line(product, qty, None, Discount::from_bps(disc)).unwrap();
        }
        let mut session = CashSession::new();
        session.open(at(9, 0));
        session
            .finalize(&mut cart, TaxRate::from_bps(rate_bps), at(9, 30))
            .unwrap()
            .clone()
    }

    #[test]
    fn test_sale_receipt_layout() {
        let sale = finalized(&[("A1", "Agua mineral", 1000, 3, 1000), ("B2", "Pan", 125, 2, 0)], 2100);
        let text = ReceiptTemplate::default().format_sale(&sale, at(9, 30));

        let expected = "\
*** Punto de venta ***
02/03/2026 09:30

A1 x3 @ $10.00 (-10.00%)
  Agua mineral
B2 x2 @ $1.25
  Pan

Base: $29.50
IVA 21.00%: $6.20
TOTAL: $35.70

¡Gracias por su compra!";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_footer_is_omitted() {
        let template = ReceiptTemplate {
            header: "SHOP".to_string(),
            footer: String::new(),
        };
        let sale = finalized(&[("A1", "Agua", 100, 1, 0)], 0);
        let text = template.format_sale(&sale, at(10, 0));

        assert!(text.starts_with("SHOP\n"));
        assert!(text.ends_with("TOTAL: $1.00"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let sale = finalized(&[("A1", "Agua", 100, 1, 0)], 2100);
        let template = ReceiptTemplate::default();
        assert_eq!(template.format_sale(&sale, at(10, 0)), template.format_sale(&sale, at(10, 0)));
        assert_ne!(template.format_sale(&sale, at(10, 0)), template.format_sale(&sale, at(10, 1)));
    }

    #[test]
    fn test_large_amounts_are_grouped() {
        let sale = finalized(&[("TV", "Televisor", 129_999, 10, 0)], 2100);
        let text = ReceiptTemplate::default().format_sale(&sale, at(10, 0));
        assert!(text.contains("TV x10 @ $1,299.99"));
        assert!(text.contains("Base: $12,999.90"));
    }

    #[test]
    fn test_totals_round_trip_through_text() {
        for (lines, rate) in [
            (vec![("A1", "Agua", 1000, 3, 1000)], 2100),
            (vec![("B2", "Pan", 333, 7, 1250), ("C3", "Aceite", 129_999, 11, 0)], 1000),
            (vec![("D4", "Sal", 1, 1, 0)], 0),
        ] {
            let sale = finalized(&lines, rate);
            let text = ReceiptTemplate::default().format_sale(&sale, at(11, 0));
            let parsed = parse_sale_totals(&text).unwrap();
            let totals = sale.totals();

            assert_eq!(parsed.subtotal, totals.subtotal);
            assert_eq!(parsed.tax, totals.tax);
            assert_eq!(parsed.total, totals.total);
        }
    }

    #[test]
    fn test_parse_sale_totals_rejects_partial_text() {
        assert!(parse_sale_totals("Base: $1.00\nTOTAL: $1.21").is_none());
        assert!(parse_sale_totals("").is_none());
    }

    #[test]
    fn test_footer_that_looks_like_totals_is_ignored() {
        let sale = finalized(&[("A1", "Agua", 1000, 3, 1000)], 2100);
        let template = ReceiptTemplate {
            header: "TOTAL: $0.01".to_string(),
            footer: "Base: $999.00\nIVA 50%: $1.00\nTOTAL: $1,000.00".to_string(),
        };
        let text = template.format_sale(&sale, at(12, 0));
        let parsed = parse_sale_totals(&text).unwrap();

        assert_eq!(parsed.subtotal.cents(), 2700);
        assert_eq!(parsed.tax.cents(), 567);
        assert_eq!(parsed.total.cents(), 3267);
    }

    #[test]
    fn test_close_receipt_layout() {
        let a = finalized(&[("A1", "Agua", 1000, 3, 1000)], 2100);
        let summary = summarize(&[a]);
        let template = ReceiptTemplate {
            header: "SHOP".to_string(),
            footer: String::new(),
        };

        let expected = "\
SHOP
*** Cierre de caja ***
02/03/2026 21:00

A1: 3 uds

Base imponible: $27.00
IVA acumulado: $5.67
Total caja: $32.67";
        assert_eq!(template.format_close(&summary, at(21, 0)), expected);
    }
}
