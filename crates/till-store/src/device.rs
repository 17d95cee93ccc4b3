//! # Printing Devices
//!
//! Discovery of and forwarding to receipt printers.
//!
//! ```text
//! list_available()  ──►  lpstat -p        "printer Epson_TM20 is idle..."
//! forward(name, t)  ──►  lpr -P <name>    receipt text on stdin
//! ```
//!
//! Nothing here is fatal. A printer that is missing or complains yields a
//! [`DeviceWarning`]; the receipt has already been stored by then.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, warn};

/// A forwarding problem. The receipt stays valid and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceWarning {
    /// The forwarding tool could not be run at all.
    #[error("Printer {device} unavailable: {reason}")]
    Unavailable { device: String, reason: String },

    /// The device or spooler answered with an error message.
    #[error("Printer {device} reported: {message}")]
    Rejected { device: String, message: String },
}

/// Something receipts can be forwarded to.
pub trait Device {
    /// Names of the devices that can be printed to. Empty when discovery
    /// is unsupported.
    fn list_available(&self) -> Vec<String>;

    fn forward(&self, device: &str, text: &str) -> Result<(), DeviceWarning>;
}

/// CUPS command-line backend.
#[derive(Debug, Clone)]
pub struct LprDevice {
    lpstat: String,
    lpr: String,
}

impl Default for LprDevice {
    fn default() -> Self {
        LprDevice::with_commands("lpstat", "lpr")
    }
}

impl LprDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses other binaries in place of `lpstat` and `lpr`.
    pub fn with_commands(lpstat: impl Into<String>, lpr: impl Into<String>) -> Self {
        LprDevice {
            lpstat: lpstat.into(),
            lpr: lpr.into(),
        }
    }
}

impl Device for LprDevice {
    fn list_available(&self) -> Vec<String> {
        match Command::new(&self.lpstat).arg("-p").output() {
            Ok(output) => parse_lpstat(&String::from_utf8_lossy(&output.stdout)),
            Err(e) => {
                debug!(command = %self.lpstat, error = %e, "Printer discovery unavailable");
                Vec::new()
            }
        }
    }

    fn forward(&self, device: &str, text: &str) -> Result<(), DeviceWarning> {
        let unavailable = |reason: String| DeviceWarning::Unavailable {
            device: device.to_string(),
            reason,
        };

        let mut child = Command::new(&self.lpr)
            .arg("-P")
            .arg(device)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => unavailable(format!("{} not found", self.lpr)),
                _ => unavailable(e.to_string()),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(text.as_bytes()) {
                // The exit status below tells whether the job was taken.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                other => other.map_err(|e| unavailable(e.to_string()))?,
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| unavailable(e.to_string()))?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() || !stderr.is_empty() {
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.lpr, output.status)
            } else {
                stderr
            };
            warn!(device, %message, "Printer rejected receipt");
            return Err(DeviceWarning::Rejected {
                device: device.to_string(),
                message,
            });
        }

        debug!(device, "Receipt forwarded to printer");
        Ok(())
    }
}

/// Extracts printer names from `lpstat -p` output.
fn parse_lpstat(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix("printer "))
        .filter_map(|rest| rest.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
