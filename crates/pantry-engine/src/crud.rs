//! Generic list/add/update/delete over one dataset.
//!
//! The pure `apply_*` functions transform an in-memory snapshot and are
//! the contract presentation code relies on; [`CrudEngine`] wraps them
//! with load-then-persist against a backend handle. Rows are identified
//! by the dataset's key column (the first declared column) wherever the
//! backend supports statements; the positional index only locates the
//! row within the loaded snapshot.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use pantry_common::{PantryError, PantryResult, Row, Table, Value};
use pantry_storage::{Statement, StorageBackend};

/// Column name → value mapping submitted by a form or CLI flags.
pub type FieldValues = HashMap<String, Value>;

/// Builds a complete row for `table` from submitted values.
///
/// Every column must be present and non-blank; names that are not table
/// columns are rejected. Violations collect into a single
/// [`PantryError::Validation`] (all or nothing).
fn build_row(table: &Table, values: &FieldValues) -> PantryResult<Row> {
    let mut bad: Vec<String> = table
        .columns()
        .iter()
        .filter(|col| values.get(*col).map_or(true, Value::is_blank))
        .cloned()
        .collect();
    bad.extend(unknown_fields(table, values));

    if !bad.is_empty() || table.num_columns() == 0 {
        return Err(PantryError::Validation { fields: bad });
    }

    let row = table
        .columns()
        .iter()
        .map(|col| values.get(col).cloned().unwrap_or(Value::Null))
        .collect();
    Ok(Row::new(row))
}

/// Names in `values` that are not columns of `table`, in submission-
/// independent sorted order.
fn unknown_fields(table: &Table, values: &FieldValues) -> Vec<String> {
    let mut unknown: Vec<String> = values
        .keys()
        .filter(|name| table.column_index(name).is_none())
        .cloned()
        .collect();
    unknown.sort();
    unknown
}

/// Appends a new row built from `values`, preserving column order.
///
/// Partial rows are never accepted: any missing or blank field rejects
/// the whole submission and leaves the snapshot unchanged.
pub fn apply_add(table: &Table, values: &FieldValues) -> PantryResult<Table> {
    let row = build_row(table, values)?;
    let mut updated = table.clone();
    updated.push_row(row)?;
    Ok(updated)
}

/// Overwrites columns of the row at `row_index` from `values`.
///
/// Columns named in `values` are overwritten unconditionally — blank is
/// a valid overwrite, enabling intentional blanking. Columns absent from
/// `values` keep their current value. Names that are not table columns
/// are a [`PantryError::Validation`].
pub fn apply_update(table: &Table, row_index: usize, values: &FieldValues) -> PantryResult<Table> {
    if row_index >= table.num_rows() {
        return Err(PantryError::IndexOutOfRange {
            index: row_index,
            rows: table.num_rows(),
        });
    }

    let unknown = unknown_fields(table, values);
    if !unknown.is_empty() {
        return Err(PantryError::Validation { fields: unknown });
    }

    let mut updated = table.clone();
    let mut row = updated
        .row(row_index)
        .cloned()
        .unwrap_or_else(|| Row::nulls(updated.num_columns()));
    for (name, value) in values {
        if let Some(col) = updated.column_index(name) {
            row.set(col, value.clone());
        }
    }
    updated.set_row(row_index, row)?;
    Ok(updated)
}

/// Removes the row at `row_index`, re-compacting the remaining indices.
pub fn apply_delete(table: &Table, row_index: usize) -> PantryResult<Table> {
    let mut updated = table.clone();
    updated.remove_row(row_index)?;
    Ok(updated)
}

/// CRUD operations bound to one backend handle.
///
/// Every operation loads a fresh snapshot, transforms it, and persists
/// the result immediately; the snapshot is then discarded, so the next
/// read reflects the backend's current state. No conflict detection is
/// performed against concurrent writers; last write wins.
pub struct CrudEngine {
    backend: Rc<dyn StorageBackend>,
}

impl CrudEngine {
    /// Creates an engine over the given backend handle.
    pub fn new(backend: Rc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Returns the current snapshot unchanged.
    pub fn list(&self) -> PantryResult<Table> {
        self.backend.load()
    }

    /// Validates and appends a new row, then persists.
    pub fn add(&self, values: &FieldValues) -> PantryResult<Table> {
        let table = self.backend.load()?;
        let updated = apply_add(&table, values)?;

        if self.backend.supports_statements() {
            let row = updated
                .row(updated.num_rows() - 1)
                .cloned()
                .unwrap_or_else(|| Row::nulls(updated.num_columns()));
            self.backend.execute(&Statement::Insert {
                columns: updated.columns().to_vec(),
                values: row.into_values(),
            })?;
        } else {
            self.backend.save(&updated)?;
        }

        debug!(dataset = %self.backend.dataset(), rows = updated.num_rows(), "row added");
        Ok(updated)
    }

    /// Overwrites the row at `row_index`, then persists.
    ///
    /// For statement-capable backends the row's key is resolved from the
    /// snapshot *before* changes are applied: the statement targets that
    /// key, not the positional index.
    pub fn update(&self, row_index: usize, values: &FieldValues) -> PantryResult<Table> {
        let table = self.backend.load()?;
        let key = self.row_key(&table, row_index)?;
        let updated = apply_update(&table, row_index, values)?;

        if self.backend.supports_statements() {
            let (key_column, key) = key.ok_or_else(|| {
                PantryError::statement(self.backend.dataset(), "table has no key column")
            })?;
            let row = updated
                .row(row_index)
                .cloned()
                .unwrap_or_else(|| Row::nulls(updated.num_columns()));
            let assignments = updated
                .columns()
                .iter()
                .cloned()
                .zip(row.into_values())
                .collect();
            self.backend.execute(&Statement::Update {
                assignments,
                key_column,
                key,
            })?;
        } else {
            self.backend.save(&updated)?;
        }

        debug!(dataset = %self.backend.dataset(), row = row_index, "row updated");
        Ok(updated)
    }

    /// Removes the row at `row_index`, then persists.
    pub fn delete(&self, row_index: usize) -> PantryResult<Table> {
        let table = self.backend.load()?;
        let key = self.row_key(&table, row_index)?;
        let updated = apply_delete(&table, row_index)?;

        if self.backend.supports_statements() {
            let (key_column, key) = key.ok_or_else(|| {
                PantryError::statement(self.backend.dataset(), "table has no key column")
            })?;
            self.backend
                .execute(&Statement::Delete { key_column, key })?;
        } else {
            self.backend.save(&updated)?;
        }

        debug!(dataset = %self.backend.dataset(), row = row_index, "row deleted");
        Ok(updated)
    }

    /// Resolves the key column and key value of the row at `row_index`
    /// from the snapshot, before any changes are applied.
    fn row_key(
        &self,
        table: &Table,
        row_index: usize,
    ) -> PantryResult<Option<(String, Value)>> {
        if row_index >= table.num_rows() {
            return Err(PantryError::IndexOutOfRange {
                index: row_index,
                rows: table.num_rows(),
            });
        }
        Ok(table.key_column().and_then(|column| {
            table
                .row(row_index)
                .and_then(|row| row.get(0))
                .map(|key| (column.to_string(), key.clone()))
        }))
    }
}
