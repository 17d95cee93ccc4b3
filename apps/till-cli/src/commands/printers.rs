//! `till printers`: list the printers receipts can be sent to.

use std::io::Write;

use till_store::Register;

use crate::error::CliResult;

pub fn run<W: Write>(register: &Register, out: &mut W) -> CliResult<()> {
    let devices = register.available_devices();
    if devices.is_empty() {
        writeln!(out, "No printers found")?;
        return Ok(());
    }

    let configured = register.settings().printer_name.as_deref();
    for device in &devices {
        let marker = if Some(device.as_str()) == configured { "*" } else { " " };
        writeln!(out, "{} {}", marker, device)?;
    }
    Ok(())
}
