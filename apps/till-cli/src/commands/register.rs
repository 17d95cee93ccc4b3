//! # `till register`: the interactive till
//!
//! Reads one command per line until `quit` or end of input.
//!
//! ```text
//! > open
//! Cash session opened
//! > add 8410001 3 - 10
//! + A1 x3 @ $10.00 (-10.00%) = $27.00
//! > pay
//! *** Punto de venta ***
//! ...
//! TOTAL: $32.67
//! > close cierre.csv
//! ```
//!
//! A failed command prints `error: ...` and the loop carries on. Cart
//! positions are 1-based here and 0-based in the register.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use till_core::parse::{discount_or, money_or, require_quantity, tax_rate_or};
use till_core::validation::validate_ui_tax_rate;
use till_core::{Discount, SaleLine, SaleTotals, SearchField, TaxRate};
use till_store::{Register, SessionClose};
use tracing::{debug, warn};

use super::{write_dispatch, write_product};
use crate::error::{CliError, CliResult};

const HELP: &str = "\
open                              open the cash session
close [export.csv]                close the session and print the summary
add <code> [qty] [price] [disc%]  add a product by barcode or reference ('-' keeps a default)
edit <n> <qty> <price> <disc%>    change line n
rm <n>                            remove line n
cart                              show the current sale
tax <rate>                        tax rate for the next sale (0-30)
pay                               charge the sale and print the receipt
find <text>                       search the catalog
help                              this text
quit                              leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Empty,
    Open,
    Close(Option<PathBuf>),
    Add {
        code: String,
        quantity: Option<String>,
        price: Option<String>,
        discount: Option<String>,
    },
    Edit {
        position: String,
        quantity: String,
        price: String,
        discount: String,
    },
    Remove(String),
    Cart,
    Tax(String),
    Pay,
    Find(String),
    Help,
    Quit,
}

/// `-` stands for "use the default" in optional positions.
fn optional(word: Option<&str>) -> Option<String> {
    word.filter(|w| *w != "-").map(str::to_string)
}

fn required(word: Option<&str>, usage: &str) -> CliResult<String> {
    word.map(str::to_string)
        .ok_or_else(|| CliError::usage(format!("usage: {}", usage)))
}

fn parse_input(line: &str) -> CliResult<Input> {
    let line = line.trim();
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let mut words = rest.split_whitespace();

    let input = match command.to_lowercase().as_str() {
        "" => Input::Empty,
        "open" => Input::Open,
        "close" => Input::Close(words.next().map(PathBuf::from)),
        "add" => Input::Add {
            code: required(words.next(), "add <code> [qty] [price] [disc%]")?,
            quantity: optional(words.next()),
            price: optional(words.next()),
            discount: optional(words.next()),
        },
        "edit" => {
            let usage = "edit <n> <qty> <price> <disc%>";
            Input::Edit {
                position: required(words.next(), usage)?,
                quantity: required(words.next(), usage)?,
                price: required(words.next(), usage)?,
                discount: required(words.next(), usage)?,
            }
        }
        "rm" | "remove" => Input::Remove(required(words.next(), "rm <n>")?),
        "cart" => Input::Cart,
        "tax" => Input::Tax(required(words.next(), "tax <rate>")?),
        "pay" => Input::Pay,
        "find" => Input::Find(rest.trim().to_string()),
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(CliError::usage(format!("unknown command '{}', try 'help'", other))),
    };
    Ok(input)
}

/// Converts a 1-based cart position to an index.
fn position(text: &str, len: usize) -> CliResult<usize> {
    match text.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(CliError::usage(format!("no line {} (cart has {} lines)", text.trim(), len))),
    }
}

fn describe(line: &SaleLine) -> String {
    let discount = if line.discount().is_zero() {
        String::new()
    } else {
        format!(" (-{}%)", line.discount())
    };
    format!(
        "{} x{} @ {}{} = {}",
        line.reference(),
        line.quantity(),
        line.unit_price(),
        discount,
        line.line_total()
    )
}

enum Flow {
    Continue,
    Quit,
}

struct Till<'a> {
    register: &'a mut Register,
    /// Rate the next `pay` charges.
    tax_rate: TaxRate,
}

impl Till<'_> {
    fn execute<W: Write>(&mut self, input: Input, out: &mut W) -> CliResult<Flow> {
        match input {
            Input::Empty => {}
            Input::Open => {
                let message = match self.register.open_session() {
                    till_core::OpenOutcome::Opened => "Cash session opened",
                    till_core::OpenOutcome::AlreadyOpen => "Cash session already open",
                };
                writeln!(out, "{}", message)?;
            }
            Input::Close(export) => self.close(export, out)?,
            Input::Add {
                code,
                quantity,
                price,
                discount,
            } => {
                let quantity = quantity.as_deref().map(require_quantity).transpose()?.unwrap_or(1);
                let price = price.and_then(|text| {
                    let catalog_price = self.register.catalog().find_by_code(&code)?.price;
                    Some(money_or(&text, catalog_price))
                });
                let discount = match discount {
                    Some(text) => discount_or(&text, Discount::none())?,
                    None => Discount::none(),
                };

                let line = self.register.add_by_code(&code, quantity, price, discount)?;
                writeln!(out, "+ {}", describe(line))?;
            }
            Input::Edit {
                position: pos,
                quantity,
                price,
                discount,
            } => {
                let index = position(&pos, self.register.cart().len())?;
                let (unit_price, current_discount) = {
                    let line = &self.register.cart().lines()[index];
                    (line.unit_price(), line.discount())
                };

                let quantity = require_quantity(&quantity)?;
                let unit_price = money_or(&price, unit_price);
                let discount = discount_or(&discount, current_discount)?;
                let line = self.register.edit_line(index, quantity, unit_price, discount)?;
                writeln!(out, "{}. {}", index + 1, describe(line))?;
            }
            Input::Remove(pos) => {
                let index = position(&pos, self.register.cart().len())?;
                let removed = self.register.remove_line(index)?;
                writeln!(out, "- {}", removed.reference())?;
            }
            Input::Cart => self.write_cart(out)?,
            Input::Tax(text) => {
                let rate = tax_rate_or(&text, self.tax_rate)?;
                validate_ui_tax_rate(rate)?;
                self.tax_rate = rate;
                writeln!(out, "Tax rate {}%", rate)?;
            }
            Input::Pay => self.pay(out)?,
            Input::Find(query) => {
                for product in self.register.search(&query, SearchField::All) {
                    write_product(out, product)?;
                }
            }
            Input::Help => writeln!(out, "{}", HELP)?,
            Input::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn write_cart<W: Write>(&self, out: &mut W) -> CliResult<()> {
        let cart = self.register.cart();
        if cart.is_empty() {
            writeln!(out, "Cart is empty")?;
            return Ok(());
        }

        for (i, line) in cart.lines().iter().enumerate() {
            writeln!(out, "{:>2}. {}", i + 1, describe(line))?;
            writeln!(out, "    {}", line.product().description)?;
        }
        let totals = SaleTotals::compute(cart.lines(), self.tax_rate);
        writeln!(out, "Base: {}", totals.subtotal)?;
        writeln!(out, "IVA {}%: {}", totals.tax_rate, totals.tax)?;
        writeln!(out, "TOTAL: {}", totals.total)?;
        Ok(())
    }

    fn pay<W: Write>(&mut self, out: &mut W) -> CliResult<()> {
        let commit = self.register.finalize(self.tax_rate)?;
        writeln!(out, "{}", commit.text)?;
        writeln!(out)?;
        write_dispatch(out, &commit.receipt)?;
        debug!(sale_id = %commit.sale_id, "Receipt shown");

        // The rate just charged is now the saved default.
        if let Err(e) = self.register.persist() {
            writeln!(out, "Warning: settings not saved: {}", e)?;
        }
        Ok(())
    }

    fn close<W: Write>(&mut self, export: Option<PathBuf>, out: &mut W) -> CliResult<()> {
        match self.register.close_session(export.as_deref())? {
            SessionClose::AlreadyClosed => writeln!(out, "Cash session already closed")?,
            SessionClose::Closed(closed) => {
                writeln!(out, "{}", closed.text)?;
                writeln!(out)?;
                write_dispatch(out, &closed.receipt)?;
                if let Some(path) = &closed.exported {
                    writeln!(out, "Quantities exported to {}", path.display())?;
                }
            }
        }
        Ok(())
    }
}

/// Runs the interactive till over `input` until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(register: &mut Register, input: R, out: &mut W) -> CliResult<()> {
    let tax_rate = register.settings().default_tax_rate;
    let mut till = Till { register, tax_rate };
    writeln!(out, "Till ready, {} products. Type 'help' for commands.", till.register.catalog().len())?;

    for line in input.lines() {
        let line = line?;
        match parse_input(&line).and_then(|command| till.execute(command, out)) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(CliError::Io(e)) => return Err(CliError::Io(e)),
            Err(e) => writeln!(out, "error: {}", e)?,
        }
    }

    if till.register.session().is_open() {
        warn!(sales = till.register.session().sales().len(), "Leaving with the cash session open");
        writeln!(out, "Cash session left open: its sales are not kept after exit")?;
    }
    Ok(())
}
