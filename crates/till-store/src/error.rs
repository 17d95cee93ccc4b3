//! # Store Error Types
//!
//! Error types for file, printer and CSV operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io / serde_json / csv errors                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the path and the operation            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CLI prints the message; in-memory state is kept as it was             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Printer trouble is NOT in here: see [`crate::device::DeviceWarning`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use till_core::CoreError;

/// Persistence and import failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a file failed.
    ///
    /// ## When This Occurs
    /// - Disk full or read-only
    /// - Missing permissions on the app directory
    /// - A receipt or state file cannot be created
    #[error("Could not access {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The state file is not valid JSON for this version.
    #[error("State file is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A CSV file could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The import file has no header row.
    #[error("Import file {} is empty", .0.display())]
    EmptyImportFile(PathBuf),

    /// No per-user data directory exists on this platform.
    #[error("Could not determine app data directory")]
    NoAppDirectory,

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Wraps an I/O error with the path it happened on.
    pub fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Persistence {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
