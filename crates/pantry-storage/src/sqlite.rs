//! Relational datasets backed by SQLite.
//!
//! One [`rusqlite::Connection`] is opened per process and shared by
//! every table-backed dataset handle. The first declared column of each
//! table is treated as the row key for statement targeting.

use std::path::Path;
use std::rc::Rc;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use pantry_common::{PantryError, PantryResult, Row, Table, Value};

use crate::backend::{Statement, StorageBackend};

/// SQLite table backend for one dataset.
pub struct SqliteBackend {
    /// Logical dataset name.
    dataset: String,
    /// Backing table name.
    table: String,
    /// Shared connection, live for the process lifetime.
    conn: Rc<Connection>,
}

impl SqliteBackend {
    /// Creates a backend for `dataset` backed by `table` on a shared
    /// connection.
    pub fn new(
        dataset: impl Into<String>,
        table: impl Into<String>,
        conn: Rc<Connection>,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            table: table.into(),
            conn,
        }
    }

    /// Opens the shared database connection.
    pub fn open_database(path: &Path) -> PantryResult<Rc<Connection>> {
        let conn = Connection::open(path)
            .map_err(|e| PantryError::Io {
                source: std::io::Error::other(format!(
                    "failed to open sqlite database {}: {e}",
                    path.display()
                )),
            })?;
        Ok(Rc::new(conn))
    }

    /// Returns the backing table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn table_exists(&self) -> PantryResult<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [&self.table],
                |row| row.get(0),
            )
            .map_err(|e| PantryError::statement(&self.dataset, e.to_string()))?;
        Ok(count > 0)
    }

    fn render(&self, statement: &Statement) -> (String, Vec<SqlValue>) {
        match statement {
            Statement::Insert { columns, values } => {
                let cols: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
                let placeholders: Vec<String> =
                    (1..=values.len()).map(|i| format!("?{i}")).collect();
                let sql = format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    quote_ident(&self.table),
                    cols.join(", "),
                    placeholders.join(", ")
                );
                (sql, values.iter().map(to_sql).collect())
            }
            Statement::Update {
                assignments,
                key_column,
                key,
            } => {
                let sets: Vec<String> = assignments
                    .iter()
                    .enumerate()
                    .map(|(i, (col, _))| format!("{} = ?{}", quote_ident(col), i + 1))
                    .collect();
                let sql = format!(
                    "UPDATE {} SET {} WHERE {} = ?{}",
                    quote_ident(&self.table),
                    sets.join(", "),
                    quote_ident(key_column),
                    assignments.len() + 1
                );
                let mut params: Vec<SqlValue> =
                    assignments.iter().map(|(_, v)| to_sql(v)).collect();
                params.push(to_sql(key));
                (sql, params)
            }
            Statement::Delete { key_column, key } => {
                let sql = format!(
                    "DELETE FROM {} WHERE {} = ?1",
                    quote_ident(&self.table),
                    quote_ident(key_column)
                );
                (sql, vec![to_sql(key)])
            }
        }
    }
}

impl StorageBackend for SqliteBackend {
    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn load(&self) -> PantryResult<Table> {
        if !self.table_exists()? {
            return Err(PantryError::DatasetNotFound {
                dataset: self.dataset.clone(),
            });
        }

        let sql = format!("SELECT * FROM {}", quote_ident(&self.table));
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| PantryError::statement(&self.dataset, e.to_string()))?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut table = Table::empty(columns);

        let mut rows = stmt
            .query([])
            .map_err(|e| PantryError::statement(&self.dataset, e.to_string()))?;
        while let Some(row) = rows
            .next()
            .map_err(|e| PantryError::statement(&self.dataset, e.to_string()))?
        {
            let mut values = Vec::with_capacity(table.num_columns());
            for i in 0..table.num_columns() {
                let value = row
                    .get_ref(i)
                    .map_err(|e| PantryError::statement(&self.dataset, e.to_string()))?;
                values.push(from_sql(value));
            }
            table.push_row(Row::new(values))?;
        }

        Ok(table)
    }

    fn save(&self, table: &Table) -> PantryResult<()> {
        let write_err = |e: rusqlite::Error| PantryError::Write {
            dataset: self.dataset.clone(),
            source: std::io::Error::other(e.to_string()),
        };

        let tx = self.conn.unchecked_transaction().map_err(write_err)?;

        if table.num_columns() > 0 {
            // Untyped columns keep SQLite's dynamic typing, so integer and
            // text values round-trip unchanged.
            let cols: Vec<String> = table.columns().iter().map(|c| quote_ident(c)).collect();
            let create = format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                quote_ident(&self.table),
                cols.join(", ")
            );
            tx.execute(&create, []).map_err(write_err)?;
        }

        let delete = format!("DELETE FROM {}", quote_ident(&self.table));
        tx.execute(&delete, []).map_err(write_err)?;

        if table.num_columns() > 0 {
            let placeholders: Vec<String> =
                (1..=table.num_columns()).map(|i| format!("?{i}")).collect();
            let insert = format!(
                "INSERT INTO {} VALUES ({})",
                quote_ident(&self.table),
                placeholders.join(", ")
            );
            let mut stmt = tx.prepare(&insert).map_err(write_err)?;
            for row in table.rows() {
                stmt.execute(params_from_iter(row.iter().map(to_sql)))
                    .map_err(write_err)?;
            }
            drop(stmt);
        }

        tx.commit().map_err(write_err)?;
        debug!(dataset = %self.dataset, rows = table.num_rows(), "saved dataset");
        Ok(())
    }

    fn execute(&self, statement: &Statement) -> PantryResult<usize> {
        let (sql, params) = self.render(statement);
        debug!(dataset = %self.dataset, sql = %sql, "executing statement");

        self.conn
            .execute(&sql, params_from_iter(params))
            .map_err(|e| PantryError::statement(&self.dataset, e.to_string()))
    }

    fn supports_statements(&self) -> bool {
        true
    }
}

/// Quotes an identifier for use in SQL text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Converts a pantry value into a bindable SQLite value.
pub fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

/// Converts a SQLite column value into a pantry value.
pub fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_backend() -> SqliteBackend {
        let conn = Rc::new(Connection::open_in_memory().unwrap());
        conn.execute_batch(
            "CREATE TABLE claims (\"Claim_ID\", \"Food_ID\", \"Status\");\n\
             INSERT INTO claims VALUES (1, 10, 'Pending');\n\
             INSERT INTO claims VALUES (2, 11, 'Completed');",
        )
        .unwrap();
        SqliteBackend::new("claims", "claims", conn)
    }

    #[test]
    fn test_load_columns_and_rows() {
        let backend = test_backend();
        let table = backend.load().unwrap();

        assert_eq!(table.columns(), &["Claim_ID", "Food_ID", "Status"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.value(0, "Status"), Some(&Value::text("Pending")));
        assert_eq!(table.value(1, "Claim_ID"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_load_missing_table() {
        let conn = Rc::new(Connection::open_in_memory().unwrap());
        let backend = SqliteBackend::new("claims", "claims", conn);

        let result = backend.load();
        assert!(matches!(result, Err(PantryError::DatasetNotFound { .. })));
    }

    #[test]
    fn test_save_overwrites_and_round_trips() {
        let backend = test_backend();
        let mut table = backend.load().unwrap();
        table
            .push_row(Row::new(vec![
                Value::Integer(3),
                Value::Integer(12),
                Value::text("Pending"),
            ]))
            .unwrap();

        backend.save(&table).unwrap();
        let loaded = backend.load().unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_save_creates_missing_table() {
        let conn = Rc::new(Connection::open_in_memory().unwrap());
        let backend = SqliteBackend::new("audit", "audit_log", conn);

        let mut table = Table::empty(vec!["Entry_ID".into(), "Detail".into()]);
        table
            .push_row(Row::new(vec![Value::Integer(1), Value::text("created")]))
            .unwrap();
        backend.save(&table).unwrap();

        assert_eq!(backend.load().unwrap(), table);
    }

    #[test]
    fn test_execute_keyed_update() {
        let backend = test_backend();

        let affected = backend
            .execute(&Statement::Update {
                assignments: vec![
                    ("Claim_ID".into(), Value::Integer(1)),
                    ("Food_ID".into(), Value::Integer(10)),
                    ("Status".into(), Value::text("Completed")),
                ],
                key_column: "Claim_ID".into(),
                key: Value::Integer(1),
            })
            .unwrap();
        assert_eq!(affected, 1);

        let table = backend.load().unwrap();
        assert_eq!(table.value(0, "Status"), Some(&Value::text("Completed")));
        assert_eq!(table.value(1, "Status"), Some(&Value::text("Completed")));
    }

    #[test]
    fn test_execute_keyed_delete() {
        let backend = test_backend();

        let affected = backend
            .execute(&Statement::Delete {
                key_column: "Claim_ID".into(),
                key: Value::Integer(2),
            })
            .unwrap();
        assert_eq!(affected, 1);

        let table = backend.load().unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.value(0, "Claim_ID"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_execute_insert() {
        let backend = test_backend();

        let affected = backend
            .execute(&Statement::Insert {
                columns: vec!["Claim_ID".into(), "Food_ID".into(), "Status".into()],
                values: vec![
                    Value::Integer(3),
                    Value::Integer(12),
                    Value::text("Pending"),
                ],
            })
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(backend.load().unwrap().num_rows(), 3);
    }

    #[test]
    fn test_values_are_bound_not_interpolated() {
        let backend = test_backend();

        // A value full of SQL metacharacters lands as plain data.
        let hostile = "'); DROP TABLE claims; --";
        backend
            .execute(&Statement::Insert {
                columns: vec!["Claim_ID".into(), "Food_ID".into(), "Status".into()],
                values: vec![Value::Integer(3), Value::Integer(12), Value::text(hostile)],
            })
            .unwrap();

        let table = backend.load().unwrap();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.value(2, "Status"), Some(&Value::text(hostile)));
    }
}
