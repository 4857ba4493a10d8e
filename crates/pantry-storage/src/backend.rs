//! The storage backend contract.

use pantry_common::{PantryResult, Table, Value};

/// A single mutation statement against one dataset.
///
/// Statements identify rows by the dataset's key column (the first
/// declared column), never by position. The target table is implied by
/// the backend handle the statement is executed against, and every value
/// is carried as data to be bound, never spliced into query text.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Append one row.
    Insert {
        /// Column names, in table order.
        columns: Vec<String>,
        /// One value per column.
        values: Vec<Value>,
    },
    /// Overwrite the row whose key column equals `key`.
    Update {
        /// `(column, new value)` pairs, in table order.
        assignments: Vec<(String, Value)>,
        /// The key column name.
        key_column: String,
        /// The key value identifying the row.
        key: Value,
    },
    /// Remove the row whose key column equals `key`.
    Delete {
        /// The key column name.
        key_column: String,
        /// The key value identifying the row.
        key: Value,
    },
}

/// Uniform read/write access to one named dataset.
///
/// Both backend variants satisfy this contract:
///
/// - [`load`](Self::load) never fails for a merely empty or unreadable
///   location; it returns a zero-row table, preserving the schema from
///   the last successful load when one is known.
/// - [`save`](Self::save) persists the full table, overwriting prior
///   content. Until the next `load`, the caller's in-memory table is the
///   source of truth.
/// - [`execute`](Self::execute) runs one keyed mutation statement.
///   File-backed datasets do not support it; callers select between
///   statements and whole-table saves via
///   [`supports_statements`](Self::supports_statements).
pub trait StorageBackend {
    /// Returns the logical dataset name this handle is scoped to.
    fn dataset(&self) -> &str;

    /// Materializes a fresh snapshot of the dataset.
    fn load(&self) -> PantryResult<Table>;

    /// Persists the full table, overwriting prior content.
    fn save(&self, table: &Table) -> PantryResult<()>;

    /// Executes one mutation statement, returning the affected row count.
    fn execute(&self, statement: &Statement) -> PantryResult<usize>;

    /// Returns true if this backend supports [`execute`](Self::execute).
    fn supports_statements(&self) -> bool {
        false
    }
}
