//! # CLI Errors
//!
//! Every failure the terminal shows. Each one prints as a single
//! human-readable line and, inside the register loop, never ends the
//! session.

use thiserror::Error;
use till_core::{CoreError, ValidationError};
use till_store::StoreError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command was typed with missing or unreadable arguments.
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(message.into())
    }
}

pub type CliResult<T> = Result<T, CliError>;
