//! Storage handles for the history table.
//!
//! Callers never hold the table across operations: every read loads it in
//! full and every write replaces it in full. There is no locking, so two
//! overlapping writers lose updates (last writer wins).

use crate::history::table::HistoryTable;
use crate::model::{GaugeSite, RiverError};
use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Load/save access to the persisted table.
pub trait HistoryStore {
    fn load(&self) -> Result<HistoryTable, RiverError>;
    fn save(&self, table: &HistoryTable) -> Result<(), RiverError>;
}

// ---------------------------------------------------------------------------
// CSV file
// ---------------------------------------------------------------------------

/// Table persisted as a CSV file at a fixed path.
#[derive(Debug, Clone)]
pub struct CsvHistoryStore {
    path: PathBuf,
}

impl CsvHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty table for `sites` if no file exists yet.
    /// Returns `true` if a file was created.
    pub fn init_if_missing(&self, sites: &[GaugeSite]) -> Result<bool, RiverError> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.save(&HistoryTable::for_sites(sites))?;
        Ok(true)
    }
}

impl HistoryStore for CsvHistoryStore {
    fn load(&self) -> Result<HistoryTable, RiverError> {
        let file = File::open(&self.path).map_err(|e| {
            RiverError::Persistence(format!("cannot open {}: {}", self.path.display(), e))
        })?;
        HistoryTable::from_csv(file)
    }

    fn save(&self, table: &HistoryTable) -> Result<(), RiverError> {
        let file = File::create(&self.path).map_err(|e| {
            RiverError::Persistence(format!("cannot write {}: {}", self.path.display(), e))
        })?;
        table.write_csv(BufWriter::new(file))
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Store backed by memory, for tests and dry runs. An empty store behaves
/// like a missing file.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    table: RefCell<Option<HistoryTable>>,
    saves: RefCell<usize>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: HistoryTable) -> Self {
        Self {
            table: RefCell::new(Some(table)),
            saves: RefCell::new(0),
        }
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }

    pub fn snapshot(&self) -> Option<HistoryTable> {
        self.table.borrow().clone()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<HistoryTable, RiverError> {
        self.table
            .borrow()
            .clone()
            .ok_or_else(|| RiverError::Persistence("no history table stored".to_string()))
    }

    fn save(&self, table: &HistoryTable) -> Result<(), RiverError> {
        *self.table.borrow_mut() = Some(table.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites() -> Vec<GaugeSite> {
        vec![
            GaugeSite::new("James River", "02037500"),
            GaugeSite::new("New River", "03171000"),
        ]
    }

    #[test]
    fn test_missing_file_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvHistoryStore::new(dir.path().join("river_levels.csv"));
        assert!(matches!(store.load(), Err(RiverError::Persistence(_))));
    }

    #[test]
    fn test_init_creates_header_only_table_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvHistoryStore::new(dir.path().join("data").join("river_levels.csv"));

        assert!(store.init_if_missing(&sites()).unwrap());
        assert!(!store.init_if_missing(&sites()).unwrap());

        let table = store.load().unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), &["Time Stamp", "James River", "New River"]);
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvHistoryStore::new(dir.path().join("river_levels.csv"));

        let mut table = HistoryTable::for_sites(&sites());
        table
            .push_row(vec!["t0".into(), "1".into(), "2".into()])
            .unwrap();
        table
            .push_row(vec!["t1".into(), "3".into(), "4".into()])
            .unwrap();
        store.save(&table).unwrap();

        let shorter = HistoryTable::for_sites(&sites());
        store.save(&shorter).unwrap();
        assert_eq!(store.load().unwrap(), shorter);
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemoryHistoryStore::new();
        assert!(store.load().is_err());
        store.save(&HistoryTable::for_sites(&sites())).unwrap();
        assert_eq!(store.save_count(), 1);
        assert!(store.load().unwrap().is_empty());
    }
}
