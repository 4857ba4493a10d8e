//! Registry configuration.
//!
//! The dataset registry is configured once at startup from a TOML file
//! (or built in code) and passed explicitly to every component that needs
//! backend access. There is no ambient global configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PantryError, PantryResult};

/// Where a dataset's rows physically live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendLocation {
    /// Delimited text file, first row = column headers.
    Csv {
        /// Path to the file.
        csv: PathBuf,
    },
    /// Table in the shared SQLite database.
    Table {
        /// Table name.
        table: String,
    },
}

/// One logical dataset and its storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Logical dataset name.
    pub name: String,

    /// Storage location.
    #[serde(flatten)]
    pub location: BackendLocation,
}

/// Dataset registry configuration.
///
/// Declaration order is significant: `TableRegistry::dataset_names`
/// reports datasets in the order they appear here.
///
/// # Example
///
/// ```rust
/// use pantry_common::config::RegistryConfig;
///
/// let config = RegistryConfig::default();
/// assert_eq!(config.datasets.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path to the SQLite database backing table-located datasets.
    #[serde(default)]
    pub sqlite_path: Option<PathBuf>,

    /// Datasets, in declaration order.
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sqlite_path: None,
            datasets: vec![
                DatasetConfig {
                    name: "providers".to_string(),
                    location: BackendLocation::Csv {
                        csv: PathBuf::from("data/providers.csv"),
                    },
                },
                DatasetConfig {
                    name: "receivers".to_string(),
                    location: BackendLocation::Csv {
                        csv: PathBuf::from("data/receivers.csv"),
                    },
                },
                DatasetConfig {
                    name: "food_listings".to_string(),
                    location: BackendLocation::Csv {
                        csv: PathBuf::from("data/food_listings.csv"),
                    },
                },
                DatasetConfig {
                    name: "claims".to_string(),
                    location: BackendLocation::Csv {
                        csv: PathBuf::from("data/claims.csv"),
                    },
                },
            ],
        }
    }
}

impl RegistryConfig {
    /// Creates an empty configuration with no datasets.
    pub fn empty() -> Self {
        Self {
            sqlite_path: None,
            datasets: Vec::new(),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> PantryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| PantryError::invalid_config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save(&self, path: &Path) -> PantryResult<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Converts configuration to a TOML string.
    pub fn to_toml(&self) -> PantryResult<String> {
        toml::to_string_pretty(self).map_err(|e| PantryError::invalid_config(e.to_string()))
    }

    /// Appends a CSV-backed dataset.
    #[must_use]
    pub fn with_csv_dataset(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.datasets.push(DatasetConfig {
            name: name.into(),
            location: BackendLocation::Csv { csv: path.into() },
        });
        self
    }

    /// Appends a SQLite-table-backed dataset.
    #[must_use]
    pub fn with_table_dataset(
        mut self,
        name: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        self.datasets.push(DatasetConfig {
            name: name.into(),
            location: BackendLocation::Table {
                table: table.into(),
            },
        });
        self
    }

    /// Sets the SQLite database path.
    #[must_use]
    pub fn with_sqlite_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sqlite_path = Some(path.into());
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> PantryResult<()> {
        for (i, dataset) in self.datasets.iter().enumerate() {
            if dataset.name.trim().is_empty() {
                return Err(PantryError::invalid_config(format!(
                    "dataset at position {i} has an empty name"
                )));
            }
            if self
                .datasets
                .iter()
                .filter(|d| d.name == dataset.name)
                .count()
                > 1
            {
                return Err(PantryError::invalid_config(format!(
                    "duplicate dataset name '{}'",
                    dataset.name
                )));
            }
        }

        let needs_sqlite = self
            .datasets
            .iter()
            .any(|d| matches!(d.location, BackendLocation::Table { .. }));
        if needs_sqlite && self.sqlite_path.is_none() {
            return Err(PantryError::invalid_config(
                "table-backed datasets require sqlite_path",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.datasets[0].name, "providers");
        assert_eq!(config.datasets[3].name, "claims");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_duplicate_name() {
        let config = RegistryConfig::empty()
            .with_csv_dataset("claims", "a.csv")
            .with_csv_dataset("claims", "b.csv");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_table_requires_sqlite_path() {
        let config = RegistryConfig::empty().with_table_dataset("claims", "claims");
        assert!(config.validate().is_err());

        let config = config.with_sqlite_path("pantry.db");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RegistryConfig::default()
            .with_sqlite_path("pantry.db")
            .with_table_dataset("audit", "audit_log");

        let toml = config.to_toml().unwrap();
        let parsed: RegistryConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pantry.toml");

        let config = RegistryConfig::empty().with_csv_dataset("providers", "data/providers.csv");
        config.save(&path).unwrap();

        let loaded = RegistryConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_declaration_order_preserved() {
        let toml = r#"
            [[datasets]]
            name = "zeta"
            csv = "z.csv"

            [[datasets]]
            name = "alpha"
            csv = "a.csv"
        "#;
        let config: RegistryConfig = toml::from_str(toml).unwrap();
        let names: Vec<&str> = config.datasets.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
