//! # Receipt Store
//!
//! Append-only directory of receipt text files.
//!
//! ```text
//! tickets/
//! ├── ticket_20260302_093012.txt
//! ├── ticket_20260302_093012_1.txt   ◄── same second, never overwritten
//! └── ticket_20260302_210000.txt
//! ```

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

const FILE_STAMP: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone)]
pub struct ReceiptStore {
    dir: PathBuf,
}

impl ReceiptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ReceiptStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `text` to a new file named after `now` and returns its path.
    ///
    /// The text is written and synced to a hidden staging file first, which
    /// is then linked under the ticket name without clobbering. When the
    /// name is taken, `_1`, `_2`, ... are tried in turn. A failed write
    /// leaves no ticket behind.
    pub fn write(&self, text: &str, now: NaiveDateTime) -> StoreResult<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::persistence(&self.dir, e))?;

        let mut staged = self.stage(text)?;
        let stem = format!("ticket_{}", now.format(FILE_STAMP));
        let mut attempt = 0usize;
        loop {
            let name = match attempt {
                0 => format!("{}.txt", stem),
                n => format!("{}_{}.txt", stem, n),
            };
            let path = self.dir.join(name);

            match staged.persist_noclobber(&path) {
                Ok(_) => {
                    debug!(?path, bytes = text.len(), "Receipt stored");
                    return Ok(path);
                }
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    staged = e.file;
                    attempt += 1;
                }
                Err(e) => return Err(StoreError::persistence(path, e.error)),
            }
        }
    }

    /// Dropping the returned file deletes it.
    fn stage(&self, text: &str) -> StoreResult<NamedTempFile> {
        let mut staged = tempfile::Builder::new()
            .prefix(".ticket")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| StoreError::persistence(&self.dir, e))?;

        staged
            .write_all(text.as_bytes())
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| StoreError::persistence(staged.path(), e))?;
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(12, 0, 5)
            .unwrap()
    }

    #[test]
    fn test_file_named_after_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReceiptStore::new(dir.path().join("tickets"));

        let path = store.write("TOTAL: $1.00", noon()).unwrap();
        assert_eq!(path.file_name().unwrap(), "ticket_20260302_120005.txt");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "TOTAL: $1.00");
    }

    #[test]
    fn test_same_second_writes_never_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReceiptStore::new(dir.path());

        let first = store.write("first", noon()).unwrap();
        let second = store.write("second", noon()).unwrap();
        let third = store.write("third", noon()).unwrap();

        assert_ne!(first, second);
        assert_eq!(second.file_name().unwrap(), "ticket_20260302_120005_1.txt");
        assert_eq!(third.file_name().unwrap(), "ticket_20260302_120005_2.txt");
        assert_eq!(std::fs::read_to_string(first).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(second).unwrap(), "second");
    }

    #[test]
    fn test_only_finished_tickets_are_left_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReceiptStore::new(dir.path());
        store.write("first", noon()).unwrap();
        store.write("second", noon()).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["ticket_20260302_120005.txt", "ticket_20260302_120005_1.txt"]);
    }

    #[test]
    fn test_taken_name_keeps_old_ticket_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReceiptStore::new(dir.path());
        std::fs::write(dir.path().join("ticket_20260302_120005.txt"), "old").unwrap();

        let path = store.write("new", noon()).unwrap();
        assert_eq!(path.file_name().unwrap(), "ticket_20260302_120005_1.txt");
        assert_eq!(std::fs::read_to_string(dir.path().join("ticket_20260302_120005.txt")).unwrap(), "old");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_unwritable_dir_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "").unwrap();
        let store = ReceiptStore::new(&blocker);

        assert!(matches!(
            store.write("x", noon()),
            Err(StoreError::Persistence { .. })
        ));
    }
}
