//! Subcommand implementations.
//!
//! Every command follows the same shape: build the registry from
//! explicit configuration, drive the engine or runner, and hand the
//! resulting table to the formatter. Commands never mutate a table
//! directly; all mutation goes through the CRUD engine.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use pantry_common::config::BackendLocation;
use pantry_common::{RegistryConfig, Row, Table, Value};
use pantry_engine::crud::{CrudEngine, FieldValues};
use pantry_engine::query::{catalog, QueryRunner};
use pantry_storage::TableRegistry;

use crate::formatter::{format_result, OutputFormat};

/// Default configuration file looked up when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "pantry.toml";

/// Writes a default configuration file.
pub fn init(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    let config = RegistryConfig::default();
    config
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Lists configured datasets and their storage locations.
pub fn datasets(config_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = load_config(config_path)?;

    let mut table = Table::empty(vec!["Dataset".into(), "Location".into()]);
    for dataset in &config.datasets {
        let location = match &dataset.location {
            BackendLocation::Csv { csv } => format!("csv:{}", csv.display()),
            BackendLocation::Table { table } => format!("table:{table}"),
        };
        table.push_row(Row::new(vec![
            Value::text(&dataset.name),
            Value::text(location),
        ]))?;
    }

    print!("{}", format_result(&table, format));
    Ok(())
}

/// Shows the current contents of a dataset.
pub fn show(config_path: Option<&Path>, dataset: &str, format: OutputFormat) -> Result<()> {
    let registry = open_registry(config_path)?;
    let engine = CrudEngine::new(registry.resolve(dataset)?);

    let table = engine.list()?;
    print_table(&table, format);
    Ok(())
}

/// Adds a row to a dataset.
pub fn add(
    config_path: Option<&Path>,
    dataset: &str,
    set: &[String],
    format: OutputFormat,
) -> Result<()> {
    let registry = open_registry(config_path)?;
    let engine = CrudEngine::new(registry.resolve(dataset)?);

    let values = parse_fields(set)?;
    let table = engine.add(&values)?;
    info!(dataset, rows = table.num_rows(), "row added");

    print_table(&table, format);
    Ok(())
}

/// Updates a row of a dataset.
pub fn update(
    config_path: Option<&Path>,
    dataset: &str,
    row: usize,
    set: &[String],
    format: OutputFormat,
) -> Result<()> {
    let registry = open_registry(config_path)?;
    let engine = CrudEngine::new(registry.resolve(dataset)?);

    let values = parse_fields(set)?;
    let table = engine.update(row, &values)?;

    print_table(&table, format);
    Ok(())
}

/// Deletes a row of a dataset.
pub fn delete(
    config_path: Option<&Path>,
    dataset: &str,
    row: usize,
    format: OutputFormat,
) -> Result<()> {
    let registry = open_registry(config_path)?;
    let engine = CrudEngine::new(registry.resolve(dataset)?);

    let table = engine.delete(row)?;

    print_table(&table, format);
    Ok(())
}

/// Lists the report query catalog.
pub fn queries(format: OutputFormat) -> Result<()> {
    let mut table = Table::empty(vec![
        "Query".into(),
        "Description".into(),
        "Parameters".into(),
    ]);
    for def in catalog() {
        let params = def
            .params
            .iter()
            .map(|p| format!("{} ({})", p.name, p.description))
            .collect::<Vec<_>>()
            .join("; ");
        table.push_row(Row::new(vec![
            Value::text(def.name),
            Value::text(def.description),
            Value::text(params),
        ]))?;
    }

    print!("{}", format_result(&table, format));
    Ok(())
}

/// Runs a report query.
pub fn query(
    config_path: Option<&Path>,
    name: &str,
    params: &[String],
    format: OutputFormat,
) -> Result<()> {
    let registry = open_registry(config_path)?;
    let runner = QueryRunner::new(&registry);

    let params = parse_fields(params)?;
    let table = runner.run(name, &params)?;

    print_table(&table, format);
    Ok(())
}

/// Loads configuration: the explicit path, else `./pantry.toml` when
/// present, else the built-in defaults.
fn load_config(config_path: Option<&Path>) -> Result<RegistryConfig> {
    match config_path {
        Some(path) => RegistryConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                RegistryConfig::from_file(default)
                    .with_context(|| format!("failed to load {}", default.display()))
            } else {
                Ok(RegistryConfig::default())
            }
        }
    }
}

fn open_registry(config_path: Option<&Path>) -> Result<TableRegistry> {
    let config = load_config(config_path)?;
    Ok(TableRegistry::open(&config)?)
}

/// Parses repeated `NAME=VALUE` arguments into field values.
///
/// Values go through the same conservative numeric inference as
/// delimited-text fields, so `--set Quantity=50` lands as an integer.
fn parse_fields(pairs: &[String]) -> Result<FieldValues> {
    let mut values = FieldValues::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("expected NAME=VALUE, got '{pair}'");
        };
        if name.is_empty() {
            bail!("expected NAME=VALUE, got '{pair}'");
        }
        values.insert(name.to_string(), Value::infer(value));
    }
    Ok(values)
}

fn print_table(table: &Table, format: OutputFormat) {
    print!("{}", format_result(table, format));
    if format == OutputFormat::Table {
        println!("({} rows)", table.num_rows());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        let values = parse_fields(&[
            "Status=Completed".to_string(),
            "Quantity=50".to_string(),
            "Note=a=b".to_string(),
        ])
        .unwrap();

        assert_eq!(values.get("Status"), Some(&Value::text("Completed")));
        assert_eq!(values.get("Quantity"), Some(&Value::Integer(50)));
        // Only the first '=' splits.
        assert_eq!(values.get("Note"), Some(&Value::text("a=b")));
    }

    #[test]
    fn test_parse_fields_blank_value_is_kept() {
        let values = parse_fields(&["Status=".to_string()]).unwrap();
        assert_eq!(values.get("Status"), Some(&Value::text("")));
    }

    #[test]
    fn test_parse_fields_rejects_malformed() {
        assert!(parse_fields(&["Status".to_string()]).is_err());
        assert!(parse_fields(&["=x".to_string()]).is_err());
    }
}
