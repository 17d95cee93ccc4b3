//! # Application Directory
//!
//! Where Till POS keeps its files.
//!
//! ```text
//! $TILL_HOME  or  ProjectDirs("com", "till", "pos").data_dir()
//! ├── app_state.json        catalog + settings
//! └── tickets/              one text file per receipt
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Environment variable that replaces the platform data directory.
pub const HOME_ENV: &str = "TILL_HOME";

const STATE_FILE: &str = "app_state.json";
const RECEIPTS_DIR: &str = "tickets";

/// The resolved application directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    /// Uses `root` as the application directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        AppPaths { root: root.into() }
    }

    /// Resolves the directory from `TILL_HOME`, falling back to the
    /// platform's per-user data directory.
    pub fn resolve() -> StoreResult<Self> {
        if let Ok(home) = std::env::var(HOME_ENV) {
            if !home.trim().is_empty() {
                debug!(path = %home, "Using app directory from environment");
                return Ok(AppPaths::at(home));
            }
        }

        directories::ProjectDirs::from("com", "till", "pos")
            .map(|dirs| AppPaths::at(dirs.data_dir()))
            .ok_or(StoreError::NoAppDirectory)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_file(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.root.join(RECEIPTS_DIR)
    }

    /// Creates the application and receipt directories if missing.
    pub fn ensure(&self) -> StoreResult<()> {
        let receipts = self.receipts_dir();
        std::fs::create_dir_all(&receipts).map_err(|e| StoreError::persistence(receipts, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let paths = AppPaths::at("/data/till");
        assert_eq!(paths.state_file(), PathBuf::from("/data/till/app_state.json"));
        assert_eq!(paths.receipts_dir(), PathBuf::from("/data/till/tickets"));
    }

    #[test]
    fn test_ensure_creates_receipts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::at(dir.path().join("nested"));

        paths.ensure().unwrap();
        assert!(paths.receipts_dir().is_dir());
    }
}
