//! File-backed datasets.
//!
//! A dataset is one delimited text file at a fixed path; the header row
//! is the schema. Writes are whole-file overwrites. Mutation statements
//! are not supported; the engine persists file-backed mutations through
//! [`StorageBackend::save`].

pub mod codec;

use std::cell::RefCell;
use std::path::PathBuf;

use tracing::warn;

use pantry_common::{PantryError, PantryResult, Table};

use crate::backend::{Statement, StorageBackend};

/// Delimited-text file backend for one dataset.
pub struct CsvBackend {
    /// Logical dataset name.
    dataset: String,
    /// Backing file path.
    path: PathBuf,
    /// Columns seen on the last successful load. A missing or unreadable
    /// file loads as an empty table with these columns.
    last_columns: RefCell<Option<Vec<String>>>,
}

impl CsvBackend {
    /// Creates a backend for `dataset` backed by the file at `path`.
    pub fn new(dataset: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
            path: path.into(),
            last_columns: RefCell::new(None),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// An empty table carrying the last-known schema, if any.
    fn empty_with_cached_schema(&self) -> Table {
        Table::empty(self.last_columns.borrow().clone().unwrap_or_default())
    }
}

impl StorageBackend for CsvBackend {
    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn load(&self) -> PantryResult<Table> {
        if !self.path.exists() {
            return Ok(self.empty_with_cached_schema());
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    dataset = %self.dataset,
                    path = %self.path.display(),
                    error = %e,
                    "failed to read dataset file, treating as empty"
                );
                return Ok(self.empty_with_cached_schema());
            }
        };

        match codec::decode(&content) {
            Ok(table) => {
                if table.num_columns() > 0 {
                    *self.last_columns.borrow_mut() = Some(table.columns().to_vec());
                }
                Ok(table)
            }
            Err(e) => {
                warn!(
                    dataset = %self.dataset,
                    path = %self.path.display(),
                    error = %e,
                    "failed to parse dataset file, treating as empty"
                );
                Ok(self.empty_with_cached_schema())
            }
        }
    }

    fn save(&self, table: &Table) -> PantryResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| PantryError::Write {
                    dataset: self.dataset.clone(),
                    source: e,
                })?;
            }
        }

        let content = codec::encode(table);
        std::fs::write(&self.path, content).map_err(|e| PantryError::Write {
            dataset: self.dataset.clone(),
            source: e,
        })?;

        *self.last_columns.borrow_mut() = Some(table.columns().to_vec());
        Ok(())
    }

    fn execute(&self, _statement: &Statement) -> PantryResult<usize> {
        Err(PantryError::statement(
            &self.dataset,
            "file-backed datasets do not support mutation statements",
        ))
    }
}
