//! # Numeric Parsing
//!
//! The single place where user-typed or file-sourced decimal text becomes
//! integer cents and basis points.
//!
//! ## Parse-or-Default Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input text          parse_fixed        *_or(text, default)             │
//! │  ──────────          ───────────        ───────────────────             │
//! │  "10"                Some(1000)         1000                            │
//! │  "10,5"              Some(1050)         1050   (comma is a decimal)    │
//! │  " 3.456 "           Some(346)          346    (half up, 2 decimals)   │
//! │  ""                  None               default                         │
//! │  "abc" / "1.2.3"     None               default                         │
//! │  "-5"                Some(-500)         -500   → range-checked later   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unparseable text falls back to the default. Parseable but out-of-range
//! values (negative price, 120% discount) are NOT silently replaced: the
//! `*_or` helpers that own a range return a [`ValidationError`].

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Discount, TaxRate};

/// Parses decimal text into a fixed-point integer with two implied decimals.
///
/// Accepts an optional sign, `,` or `.` as decimal separator and any number
/// of fractional digits (rounded half away from zero at the third). Returns
/// `None` for blank text, stray characters or overflow.
///
/// ## Example
/// ```rust
/// use till_core::parse::parse_fixed;
///
/// assert_eq!(parse_fixed("12.34"), Some(1234));
/// assert_eq!(parse_fixed("12,345"), Some(1235));
/// assert_eq!(parse_fixed("-0.5"), Some(-50));
/// assert_eq!(parse_fixed("12a"), None);
/// ```
pub fn parse_fixed(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let mut parts = body.splitn(2, ['.', ',']);
    let whole = parts.next().unwrap_or("");
    let frac = parts.next().unwrap_or("");

    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut value: i64 = 0;
    for b in whole.bytes() {
        value = value.checked_mul(10)?.checked_add((b - b'0') as i64)?;
    }

    let mut frac_digits = frac.bytes().map(|b| (b - b'0') as i64);
    let tenths = frac_digits.next().unwrap_or(0);
    let hundredths = frac_digits.next().unwrap_or(0);
    let round_up = frac_digits.next().is_some_and(|d| d >= 5);

    value = value
        .checked_mul(100)?
        .checked_add(tenths * 10 + hundredths + round_up as i64)?;

    Some(if negative { -value } else { value })
}

/// Parses a money amount; `None` when the text is not a number.
pub fn parse_money(text: &str) -> Option<Money> {
    parse_fixed(text).map(Money::from_cents)
}

/// Parses a money amount, falling back to `default` for blank or bad text.
///
/// The result may be negative; callers that need a price validate it.
pub fn money_or(text: &str, default: Money) -> Money {
    parse_money(text).unwrap_or(default)
}

/// Parses a discount percentage, falling back to `default` for blank or bad text.
///
/// ## Errors
/// A number outside `0..=100` is a validation error, not a fallback.
pub fn discount_or(text: &str, default: Discount) -> Result<Discount, ValidationError> {
    match parse_fixed(text) {
        None => Ok(default),
        Some(bps) if (0..=Discount::MAX_BPS as i64).contains(&bps) => {
            Ok(Discount::from_bps(bps as u32))
        }
        Some(_) => Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        }),
    }
}

/// Parses a tax rate percentage, falling back to `default` for blank or bad text.
///
/// ## Errors
/// A negative number is a validation error. There is no upper bound here.
pub fn tax_rate_or(text: &str, default: TaxRate) -> Result<TaxRate, ValidationError> {
    match parse_fixed(text) {
        None => Ok(default),
        Some(bps) if bps < 0 => Err(ValidationError::MustBePositive {
            field: "tax rate".to_string(),
        }),
        Some(bps) => u32::try_from(bps)
            .map(TaxRate::from_bps)
            .map_err(|_| ValidationError::OutOfRange {
                field: "tax rate".to_string(),
                min: 0,
                max: u32::MAX as i64 / 100,
            }),
    }
}

/// Parses a non-negative price. Used by import, where bad rows are skipped.
pub fn parse_price(text: &str) -> Option<Money> {
    parse_money(text).filter(|m| !m.is_negative())
}

/// Parses a quantity strictly: a positive whole number, nothing else.
///
/// ## Example
/// ```rust
/// use till_core::parse::require_quantity;
///
/// assert_eq!(require_quantity(" 3 ").unwrap(), 3);
/// assert!(require_quantity("0").is_err());
/// assert!(require_quantity("1.5").is_err());
/// ```
pub fn require_quantity(text: &str) -> Result<i64, ValidationError> {
    let qty: i64 = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must be a whole number".to_string(),
        })?;

    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(qty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_accepts_common_forms() {
        assert_eq!(parse_fixed("10"), Some(1000));
        assert_eq!(parse_fixed("10."), Some(1000));
        assert_eq!(parse_fixed(".5"), Some(50));
        assert_eq!(parse_fixed("10,5"), Some(1050));
        assert_eq!(parse_fixed("  7.25  "), Some(725));
        assert_eq!(parse_fixed("+3"), Some(300));
        assert_eq!(parse_fixed("-2.5"), Some(-250));
    }

    #[test]
    fn test_parse_fixed_rounds_half_up() {
        assert_eq!(parse_fixed("1.234"), Some(123));
        assert_eq!(parse_fixed("1.235"), Some(124));
        assert_eq!(parse_fixed("1.2349999"), Some(123));
        assert_eq!(parse_fixed("-1.235"), Some(-124));
    }

    #[test]
    fn test_parse_fixed_rejects_garbage() {
        assert_eq!(parse_fixed(""), None);
        assert_eq!(parse_fixed("   "), None);
        assert_eq!(parse_fixed("-"), None);
        assert_eq!(parse_fixed("."), None);
        assert_eq!(parse_fixed("1.2.3"), None);
        assert_eq!(parse_fixed("1,000.50"), None);
        assert_eq!(parse_fixed("abc"), None);
        assert_eq!(parse_fixed("1e3"), None);
        assert_eq!(parse_fixed("99999999999999999999"), None);
    }

    #[test]
    fn test_money_or_falls_back() {
        let default = Money::from_cents(999);
        assert_eq!(money_or("", default), default);
        assert_eq!(money_or("n/a", default), default);
        assert_eq!(money_or("12", default).cents(), 1200);
    }

    #[test]
    fn test_discount_or() {
        assert_eq!(discount_or("", Discount::none()).unwrap(), Discount::none());
        assert_eq!(discount_or("10", Discount::none()).unwrap().bps(), 1000);
        assert_eq!(discount_or("100", Discount::none()).unwrap(), Discount::full());
        assert!(discount_or("100.01", Discount::none()).is_err());
        assert!(discount_or("-1", Discount::none()).is_err());
    }

    #[test]
    fn test_tax_rate_or() {
        let default = TaxRate::from_bps(2100);
        assert_eq!(tax_rate_or("", default).unwrap(), default);
        assert_eq!(tax_rate_or("10,5", default).unwrap().bps(), 1050);
        assert_eq!(tax_rate_or("45", default).unwrap().bps(), 4500);
        assert!(tax_rate_or("-1", default).is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("3,50"), Some(Money::from_cents(350)));
        assert_eq!(parse_price("-1"), None);
        assert_eq!(parse_price("free"), None);
    }

    #[test]
    fn test_require_quantity() {
        assert_eq!(require_quantity("1").unwrap(), 1);
        assert!(matches!(
            require_quantity("-2"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            require_quantity("two"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}
