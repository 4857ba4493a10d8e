//! Table representation.
//!
//! A `Table` is materialized fresh on every load and discarded after
//! mutations are persisted; it is also the tabular result returned to
//! presentation code, which renders it without ever mutating it.

use std::fmt;

use crate::error::{PantryError, PantryResult};

use super::{Row, Value};

/// An ordered list of column names plus zero or more rows.
///
/// Invariant: every row has exactly one value per column, and column
/// order is stable for the table's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column names, in declaration order.
    columns: Vec<String>,
    /// Rows, in source order.
    rows: Vec<Row>,
}

impl Table {
    /// Creates a table with the given columns and no rows.
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a table from columns and rows, checking the width invariant.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> PantryResult<Self> {
        let mut table = Self::empty(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the index of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the first declared column, the key column for backends
    /// that support keyed lookups.
    pub fn key_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the row at the given index.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Returns the value at the given row and named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    /// Appends a row, enforcing the width invariant.
    pub fn push_row(&mut self, row: Row) -> PantryResult<()> {
        if row.len() != self.columns.len() {
            return Err(PantryError::SchemaMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Replaces the row at the given index, enforcing the width invariant.
    pub fn set_row(&mut self, index: usize, row: Row) -> PantryResult<()> {
        if row.len() != self.columns.len() {
            return Err(PantryError::SchemaMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        if index >= self.rows.len() {
            return Err(PantryError::IndexOutOfRange {
                index,
                rows: self.rows.len(),
            });
        }
        self.rows[index] = row;
        Ok(())
    }

    /// Removes and returns the row at the given index, re-compacting the
    /// remaining indices.
    pub fn remove_row(&mut self, index: usize) -> PantryResult<Row> {
        if index >= self.rows.len() {
            return Err(PantryError::IndexOutOfRange {
                index,
                rows: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.columns.join(", "))?;
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
