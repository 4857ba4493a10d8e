//! Query execution.
//!
//! Sources are loaded through the registry and staged into an in-memory
//! SQLite session, mirroring how the snapshots would look in a live
//! database; the catalog SQL then runs against the staged tables. An
//! empty or missing source yields an empty result with the definition's
//! declared output columns rather than an error, so presentation code
//! can render a benign "no data" state without special-casing.

use std::collections::HashMap;

use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use pantry_common::{PantryError, PantryResult, Row, Table, Value};
use pantry_storage::sqlite::{from_sql, quote_ident, to_sql};
use pantry_storage::TableRegistry;

use super::catalog::{self, QueryDef};

/// Executes named aggregate queries against registered datasets.
pub struct QueryRunner<'a> {
    registry: &'a TableRegistry,
}

impl<'a> QueryRunner<'a> {
    /// Creates a runner over the given registry.
    pub fn new(registry: &'a TableRegistry) -> Self {
        Self { registry }
    }

    /// Runs the named query with the given filter parameters.
    ///
    /// Unknown query names are [`PantryError::UnknownQuery`]; unknown
    /// parameter names and execution failures are
    /// [`PantryError::Query`]. Every parameter is bound, never
    /// interpolated; unsupplied parameters bind NULL.
    pub fn run(&self, name: &str, params: &HashMap<String, Value>) -> PantryResult<Table> {
        let def = catalog::find(name).ok_or_else(|| PantryError::UnknownQuery {
            query: name.to_string(),
        })?;

        for key in params.keys() {
            if !def.params.iter().any(|p| p.name == key.as_str()) {
                return Err(PantryError::query(
                    name,
                    format!("unknown parameter '{key}'"),
                ));
            }
        }

        let Some(sources) = self.load_sources(def)? else {
            return Ok(empty_result(def));
        };

        let conn = Connection::open_in_memory()
            .map_err(|e| PantryError::query(name, e.to_string()))?;
        for (source, table) in &sources {
            stage(&conn, source, table).map_err(|e| PantryError::query(name, e.to_string()))?;
        }

        let bound: Vec<rusqlite::types::Value> = def
            .params
            .iter()
            .map(|p| params.get(p.name).map_or(rusqlite::types::Value::Null, to_sql))
            .collect();

        debug!(query = name, params = bound.len(), "running query");
        self.execute(def, &conn, bound)
    }

    /// Loads every source dataset, or `None` when any is empty/missing.
    fn load_sources(&self, def: &QueryDef) -> PantryResult<Option<Vec<(&'static str, Table)>>> {
        let mut sources = Vec::with_capacity(def.sources.len());
        for source in def.sources {
            let backend = match self.registry.resolve(source) {
                Ok(backend) => backend,
                Err(PantryError::UnknownDataset { .. }) => return Ok(None),
                Err(e) => return Err(PantryError::query(def.name, e.to_string())),
            };
            let table = match backend.load() {
                Ok(table) => table,
                Err(PantryError::DatasetNotFound { .. }) => return Ok(None),
                Err(e) => return Err(PantryError::query(def.name, e.to_string())),
            };
            if table.num_columns() == 0 || table.is_empty() {
                return Ok(None);
            }
            sources.push((*source, table));
        }
        Ok(Some(sources))
    }

    fn execute(
        &self,
        def: &QueryDef,
        conn: &Connection,
        bound: Vec<rusqlite::types::Value>,
    ) -> PantryResult<Table> {
        let query_err = |e: rusqlite::Error| PantryError::query(def.name, e.to_string());

        let mut stmt = conn.prepare(def.sql).map_err(query_err)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut result = Table::empty(columns);

        let mut rows = stmt.query(params_from_iter(bound)).map_err(query_err)?;
        while let Some(row) = rows.next().map_err(query_err)? {
            let mut values = Vec::with_capacity(result.num_columns());
            for i in 0..result.num_columns() {
                values.push(from_sql(row.get_ref(i).map_err(query_err)?));
            }
            result.push_row(Row::new(values))?;
        }

        Ok(result)
    }
}

/// The empty result for a definition: declared columns, zero rows.
fn empty_result(def: &QueryDef) -> Table {
    Table::empty(def.columns.iter().map(|c| c.to_string()).collect())
}

/// Stages one loaded table under its dataset name.
fn stage(conn: &Connection, source: &str, table: &Table) -> rusqlite::Result<()> {
    let cols: Vec<String> = table.columns().iter().map(|c| quote_ident(c)).collect();
    let create = format!("CREATE TABLE {} ({})", quote_ident(source), cols.join(", "));
    conn.execute(&create, [])?;

    let placeholders: Vec<String> = (1..=table.num_columns()).map(|i| format!("?{i}")).collect();
    let insert = format!(
        "INSERT INTO {} VALUES ({})",
        quote_ident(source),
        placeholders.join(", ")
    );
    let mut stmt = conn.prepare(&insert)?;
    for row in table.rows() {
        stmt.execute(params_from_iter(row.iter().map(to_sql)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_common::RegistryConfig;
    use pantry_storage::{CsvBackend, StorageBackend};
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    fn seeded_registry(tmp: &TempDir) -> TableRegistry {
        write_csv(
            tmp,
            "providers.csv",
            "Provider_ID,Name,Type,Address,City,Contact\n\
             1,Fresh Farm,Grocery,12 High St,Springfield,555-0101\n\
             2,Daily Bread,Bakery,3 Mill Rd,Springfield,555-0102\n\
             3,Green Basket,Grocery,9 Lake Ave,Shelbyville,555-0103\n",
        );
        write_csv(
            tmp,
            "receivers.csv",
            "Receiver_ID,Name,Type,City,Contact\n\
             5,Hope Shelter,NGO,Springfield,555-0201\n\
             6,Jordan Lee,Individual,Shelbyville,555-0202\n",
        );
        write_csv(
            tmp,
            "food_listings.csv",
            "Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type\n\
             10,Bread,20,2024-02-01,2,Bakery,Springfield,Vegetarian,Breakfast\n\
             11,Rice,50,2024-03-01,1,Grocery,Springfield,Vegan,Lunch\n\
             12,Soup,15,2024-01-20,3,Grocery,Shelbyville,Vegetarian,Dinner\n",
        );
        write_csv(
            tmp,
            "claims.csv",
            "Claim_ID,Food_ID,Receiver_ID,Status,Timestamp\n\
             1,10,5,Completed,2024-01-01\n\
             2,11,5,Pending,2024-01-02\n\
             3,12,6,Completed,2024-01-03\n",
        );

        let config = RegistryConfig::empty()
            .with_csv_dataset("providers", tmp.path().join("providers.csv"))
            .with_csv_dataset("receivers", tmp.path().join("receivers.csv"))
            .with_csv_dataset("food_listings", tmp.path().join("food_listings.csv"))
            .with_csv_dataset("claims", tmp.path().join("claims.csv"));
        TableRegistry::open(&config).unwrap()
    }

    #[test]
    fn test_unknown_query() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        let runner = QueryRunner::new(&registry);

        let result = runner.run("no_such_query", &HashMap::new());
        assert!(matches!(result, Err(PantryError::UnknownQuery { .. })));
    }

    #[test]
    fn test_unknown_parameter() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        let runner = QueryRunner::new(&registry);

        let mut params = HashMap::new();
        params.insert("city".to_string(), Value::text("Springfield"));
        let result = runner.run("providers_by_city", &params);
        assert!(matches!(result, Err(PantryError::Query { .. })));
    }

    #[test]
    fn test_providers_by_city_ordering() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        let runner = QueryRunner::new(&registry);

        let result = runner.run("providers_by_city", &HashMap::new()).unwrap();
        assert_eq!(result.columns(), &["City", "provider_count"]);
        assert_eq!(result.num_rows(), 2);
        assert_eq!(result.value(0, "City"), Some(&Value::text("Springfield")));
        assert_eq!(result.value(0, "provider_count"), Some(&Value::Integer(2)));
        assert_eq!(result.value(1, "City"), Some(&Value::text("Shelbyville")));
    }

    #[test]
    fn test_type_filter_is_bound() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        let runner = QueryRunner::new(&registry);

        let mut params = HashMap::new();
        params.insert("type".to_string(), Value::text("Grocery"));
        let result = runner.run("provider_type_counts", &params).unwrap();
        assert_eq!(result.num_rows(), 1);
        assert_eq!(result.value(0, "Type"), Some(&Value::text("Grocery")));
        assert_eq!(result.value(0, "provider_count"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_unfiltered_when_parameter_absent() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        let runner = QueryRunner::new(&registry);

        let result = runner.run("provider_type_counts", &HashMap::new()).unwrap();
        assert_eq!(result.num_rows(), 2);
    }

    #[test]
    fn test_hostile_parameter_is_data_not_sql() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        let runner = QueryRunner::new(&registry);

        let mut params = HashMap::new();
        params.insert(
            "type".to_string(),
            Value::text("Grocery' OR '1'='1"),
        );
        let result = runner.run("provider_type_counts", &params).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_join_query() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        let runner = QueryRunner::new(&registry);

        let result = runner.run("receivers_most_claims", &HashMap::new()).unwrap();
        assert_eq!(result.columns(), &["Receiver", "claim_count"]);
        assert_eq!(result.value(0, "Receiver"), Some(&Value::text("Hope Shelter")));
        assert_eq!(result.value(0, "claim_count"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_empty_source_yields_declared_columns() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        // Empty the claims dataset (header only).
        CsvBackend::new("claims", tmp.path().join("claims.csv"))
            .save(&Table::empty(vec![
                "Claim_ID".into(),
                "Food_ID".into(),
                "Receiver_ID".into(),
                "Status".into(),
                "Timestamp".into(),
            ]))
            .unwrap();
        let runner = QueryRunner::new(&registry);

        let result = runner.run("claim_status_share", &HashMap::new()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns(), &["Status", "percentage"]);
    }

    #[test]
    fn test_missing_source_yields_declared_columns() {
        let tmp = TempDir::new().unwrap();
        let config = RegistryConfig::empty()
            .with_csv_dataset("food_listings", tmp.path().join("absent.csv"));
        let registry = TableRegistry::open(&config).unwrap();
        let runner = QueryRunner::new(&registry);

        let result = runner.run("listings_by_location", &HashMap::new()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns(), &["Location", "listing_count"]);
    }

    #[test]
    fn test_expiring_soon_limit() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        let runner = QueryRunner::new(&registry);

        let mut params = HashMap::new();
        params.insert("limit".to_string(), Value::Integer(2));
        let result = runner.run("expiring_soon", &params).unwrap();
        assert_eq!(result.num_rows(), 2);
        assert_eq!(result.value(0, "Food_Name"), Some(&Value::text("Soup")));
    }

    #[test]
    fn test_success_rate_rounding() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        let runner = QueryRunner::new(&registry);

        let result = runner.run("meal_type_success_rate", &HashMap::new()).unwrap();
        // Breakfast and Dinner claims are Completed, Lunch is Pending.
        assert_eq!(result.value(0, "success_rate"), Some(&Value::Float(100.0)));
        assert_eq!(
            result.value(result.num_rows() - 1, "success_rate"),
            Some(&Value::Float(0.0))
        );
    }

    #[test]
    fn test_result_columns_match_declarations() {
        let tmp = TempDir::new().unwrap();
        let registry = seeded_registry(&tmp);
        let runner = QueryRunner::new(&registry);

        for def in catalog::catalog() {
            let result = runner.run(def.name, &HashMap::new()).unwrap();
            assert_eq!(result.columns(), def.columns, "columns of {}", def.name);
        }
    }
}
