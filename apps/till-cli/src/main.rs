//! # till: Single-Register Point of Sale
//!
//! Entry point of the terminal till.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Startup Sequence                                     │
//! │                                                                         │
//! │  1. Parse arguments (clap)                                             │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  2. Initialize logging (tracing, stderr)                               │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  3. Resolve app directory (--home, TILL_HOME, platform data dir)       │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  4. Register::open (state file, env overrides, receipt store, lpr)     │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  5. Run the subcommand                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use till_store::{AppPaths, LprDevice, Register};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::config::ConfigCommand;
use commands::import::ImportArgs;
use commands::products::ProductsArgs;
use error::CliResult;

#[derive(Debug, Parser)]
#[command(name = "till", version, about = "Single-register point of sale for the terminal.")]
struct Cli {
    /// Application directory (default: $TILL_HOME or the platform data directory).
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List or search the catalog.
    Products(ProductsArgs),
    /// Import products from a CSV file.
    Import(ImportArgs),
    /// List the printers receipts can be sent to.
    Printers,
    /// Show or change register settings.
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
    /// Run the interactive till on standard input.
    Register,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

/// Logs to stderr, filtered by `RUST_LOG` (default `info,till=debug`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,till=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> CliResult<()> {
    let paths = match cli.home {
        Some(home) => AppPaths::at(home),
        None => AppPaths::resolve()?,
    };
    info!(root = ?paths.root(), "Starting till");

    let mut register = Register::open(&paths, Box::new(LprDevice::new()))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.cmd {
        Command::Products(args) => commands::products::run(&register, args, &mut out),
        Command::Import(args) => commands::import::run(&mut register, args, &mut out),
        Command::Printers => commands::printers::run(&register, &mut out),
        Command::Config { cmd } => commands::config::run(&mut register, cmd, &mut out),
        Command::Register => {
            let stdin = std::io::stdin();
            commands::register::run(&mut register, stdin.lock(), &mut out)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    use till_store::{AppPaths, Device, DeviceWarning, Register};

    /// A device that has no printers and accepts nothing.
    pub struct NoDevice;

    impl Device for NoDevice {
        fn list_available(&self) -> Vec<String> {
            Vec::new()
        }

        fn forward(&self, device: &str, _text: &str) -> Result<(), DeviceWarning> {
            Err(DeviceWarning::Unavailable {
                device: device.to_string(),
                reason: "no device in tests".to_string(),
            })
        }
    }

    /// An empty register stored under `dir`.
    pub fn register_in(dir: &Path) -> Register {
        Register::open(&AppPaths::at(dir), Box::new(NoDevice)).unwrap()
    }
}
