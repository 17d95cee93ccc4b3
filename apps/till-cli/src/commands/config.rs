//! `till config`: show or change register settings.

use std::io::Write;

use clap::{Args, Subcommand};
use till_core::parse::tax_rate_or;
use till_core::validation::validate_ui_tax_rate;
use till_store::Register;
use tracing::info;

use crate::error::CliResult;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the current settings.
    Show,
    /// Change one or more settings and save them.
    Set(SetArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Printer receipts are sent to.
    #[arg(long, conflicts_with = "no_printer")]
    pub printer: Option<String>,

    /// Stop sending receipts to a printer.
    #[arg(long, default_value_t = false)]
    pub no_printer: bool,

    /// First line of every receipt. A blank value keeps the current header.
    #[arg(long)]
    pub header: Option<String>,

    /// Last line of every receipt. Empty removes it.
    #[arg(long)]
    pub footer: Option<String>,

    /// Default tax rate in percent, e.g. 21 or 10,5 (at most 30).
    #[arg(long)]
    pub tax_rate: Option<String>,
}

pub fn run<W: Write>(register: &mut Register, command: &ConfigCommand, out: &mut W) -> CliResult<()> {
    if let ConfigCommand::Set(args) = command {
        apply(register, args)?;
        register.persist()?;
        info!("Settings saved");
    }
    show(register, out)
}

fn apply(register: &mut Register, args: &SetArgs) -> CliResult<()> {
    // Validate first so a bad rate changes nothing.
    let rate = match &args.tax_rate {
        Some(text) => {
            let rate = tax_rate_or(text, register.settings().default_tax_rate)?;
            validate_ui_tax_rate(rate)?;
            Some(rate)
        }
        None => None,
    };

    if args.no_printer {
        register.set_printer(None);
    } else if let Some(printer) = &args.printer {
        register.set_printer(Some(printer.as_str()));
    }
    if let Some(header) = &args.header {
        register.set_header(header);
    }
    if let Some(footer) = &args.footer {
        register.set_footer(footer);
    }
    if let Some(rate) = rate {
        register.set_default_tax_rate(rate);
    }
    Ok(())
}

fn show<W: Write>(register: &Register, out: &mut W) -> CliResult<()> {
    let settings = register.settings();
    writeln!(out, "printer:  {}", settings.printer_name.as_deref().unwrap_or("(none)"))?;
    writeln!(out, "header:   {}", settings.template.header)?;
    writeln!(out, "footer:   {}", settings.template.footer)?;
    writeln!(out, "tax rate: {}%", settings.default_tax_rate)?;
    writeln!(out, "tickets:  {}", register.receipts_dir().display())?;
    Ok(())
}
