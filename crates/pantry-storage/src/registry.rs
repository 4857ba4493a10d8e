//! The dataset registry.
//!
//! Built once at startup from an explicit [`RegistryConfig`] and
//! read-only thereafter. Backend handles are created eagerly and live as
//! long as the registry, so per-handle state (such as a file backend's
//! last-known schema) persists across operations.

use std::rc::Rc;

use pantry_common::config::{BackendLocation, RegistryConfig};
use pantry_common::{PantryError, PantryResult};

use crate::backend::StorageBackend;
use crate::csv::CsvBackend;
use crate::sqlite::SqliteBackend;

/// Immutable mapping from logical dataset name to a backend handle.
pub struct TableRegistry {
    /// Handles in configuration order.
    entries: Vec<(String, Rc<dyn StorageBackend>)>,
}

impl TableRegistry {
    /// Builds a registry from configuration, opening the shared SQLite
    /// connection when any dataset is table-backed.
    pub fn open(config: &RegistryConfig) -> PantryResult<Self> {
        config.validate()?;

        let conn = match &config.sqlite_path {
            Some(path)
                if config
                    .datasets
                    .iter()
                    .any(|d| matches!(d.location, BackendLocation::Table { .. })) =>
            {
                Some(SqliteBackend::open_database(path)?)
            }
            _ => None,
        };

        let mut entries: Vec<(String, Rc<dyn StorageBackend>)> = Vec::new();
        for dataset in &config.datasets {
            let backend: Rc<dyn StorageBackend> = match &dataset.location {
                BackendLocation::Csv { csv } => Rc::new(CsvBackend::new(&dataset.name, csv)),
                BackendLocation::Table { table } => {
                    // validate() guarantees sqlite_path, so conn is Some here.
                    let conn = conn.as_ref().ok_or_else(|| {
                        PantryError::invalid_config("table-backed datasets require sqlite_path")
                    })?;
                    Rc::new(SqliteBackend::new(&dataset.name, table, Rc::clone(conn)))
                }
            };
            entries.push((dataset.name.clone(), backend));
        }

        Ok(Self { entries })
    }

    /// Returns dataset names in configuration order.
    pub fn dataset_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Returns true if the named dataset is configured.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Returns the number of configured datasets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no datasets are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a dataset name to its backend handle.
    pub fn resolve(&self, name: &str) -> PantryResult<Rc<dyn StorageBackend>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, backend)| Rc::clone(backend))
            .ok_or_else(|| PantryError::UnknownDataset {
                dataset: name.to_string(),
            })
    }
}
