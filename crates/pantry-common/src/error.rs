//! Error types.
//!
//! Every fallible operation in Pantry reports a [`PantryError`] carrying
//! enough context (dataset or query name, underlying cause) to display a
//! user-facing message. Errors are never retried automatically and never
//! abort the process; a failed operation leaves prior state untouched.

use std::fmt;

use thiserror::Error;

/// Error codes for categorizing errors.
///
/// Stable across versions; usable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    /// Unknown or unspecified error.
    Unknown = 0x0000,
    /// Invalid configuration.
    InvalidConfig = 0x0001,

    /// General I/O error.
    Io = 0x0100,
    /// Backing location absent.
    DatasetNotFound = 0x0101,
    /// Persisting a table failed.
    WriteFailed = 0x0102,

    /// Dataset name not configured.
    UnknownDataset = 0x0200,
    /// Query name not in the catalog.
    UnknownQuery = 0x0201,

    /// Missing or blank fields on add.
    Validation = 0x0300,
    /// Row index outside the snapshot.
    IndexOutOfRange = 0x0301,
    /// Row width does not match the table's column count.
    SchemaMismatch = 0x0302,

    /// Mutation statement failed.
    StatementFailed = 0x0400,
    /// Aggregate query execution failed.
    QueryFailed = 0x0401,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Storage",
            0x02 => "Registry",
            0x03 => "Crud",
            0x04 => "Execution",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for Pantry.
///
/// # Example
///
/// ```rust
/// use pantry_common::error::{PantryError, PantryResult};
///
/// fn resolve(name: &str) -> PantryResult<()> {
///     Err(PantryError::UnknownDataset { dataset: name.to_string() })
/// }
/// ```
#[derive(Debug, Error)]
pub enum PantryError {
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// I/O error from the underlying system.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The dataset's backing location is absent.
    #[error("dataset '{dataset}' has no backing location")]
    DatasetNotFound {
        /// The dataset name.
        dataset: String,
    },

    /// Persisting a table failed.
    #[error("failed to write dataset '{dataset}': {source}")]
    Write {
        /// The dataset name.
        dataset: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Dataset name not present in the registry.
    #[error("unknown dataset '{dataset}'")]
    UnknownDataset {
        /// The unrecognized name.
        dataset: String,
    },

    /// Query name not present in the catalog.
    #[error("unknown query '{query}'")]
    UnknownQuery {
        /// The unrecognized name.
        query: String,
    },

    /// One or more fields were missing, blank, or not table columns.
    #[error("{}", if fields.is_empty() {
        "table has no columns to fill".to_string()
    } else {
        format!("missing or blank fields: {}", fields.join(", "))
    })]
    Validation {
        /// The offending column names, in table column order.
        fields: Vec<String>,
    },

    /// Row index outside the current snapshot.
    #[error("row index {index} out of range for table with {rows} rows")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of rows in the snapshot.
        rows: usize,
    },

    /// A row's width does not match the table's column count.
    #[error("row has {actual} values but the table has {expected} columns")]
    SchemaMismatch {
        /// Number of columns in the table.
        expected: usize,
        /// Number of values in the offending row.
        actual: usize,
    },

    /// A mutation statement failed or is unsupported by the backend.
    #[error("statement against dataset '{dataset}' failed: {message}")]
    Statement {
        /// The dataset name.
        dataset: String,
        /// The underlying cause.
        message: String,
    },

    /// An aggregate query failed to execute.
    #[error("query '{query}' failed: {message}")]
    Query {
        /// The query name.
        query: String,
        /// The underlying cause.
        message: String,
    },
}

impl PantryError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::Io { .. } => ErrorCode::Io,
            Self::DatasetNotFound { .. } => ErrorCode::DatasetNotFound,
            Self::Write { .. } => ErrorCode::WriteFailed,
            Self::UnknownDataset { .. } => ErrorCode::UnknownDataset,
            Self::UnknownQuery { .. } => ErrorCode::UnknownQuery,
            Self::Validation { .. } => ErrorCode::Validation,
            Self::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            Self::SchemaMismatch { .. } => ErrorCode::SchemaMismatch,
            Self::Statement { .. } => ErrorCode::StatementFailed,
            Self::Query { .. } => ErrorCode::QueryFailed,
        }
    }

    /// Creates an invalid-configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a statement error for the given dataset.
    #[must_use]
    pub fn statement(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Statement {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Creates a query-execution error for the given query.
    #[must_use]
    pub fn query(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            query: query.into(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout Pantry.
pub type PantryResult<T> = Result<T, PantryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = PantryError::UnknownDataset {
            dataset: "claims".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::UnknownDataset);
        assert_eq!(err.code().category(), "Registry");
    }

    #[test]
    fn test_error_display() {
        let err = PantryError::IndexOutOfRange { index: 7, rows: 3 };
        assert_eq!(
            err.to_string(),
            "row index 7 out of range for table with 3 rows"
        );
    }

    #[test]
    fn test_validation_lists_fields() {
        let err = PantryError::Validation {
            fields: vec!["City".to_string(), "Contact".to_string()],
        };
        assert_eq!(err.to_string(), "missing or blank fields: City, Contact");
        assert_eq!(err.code().category(), "Crud");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PantryError = io_err.into();
        assert_eq!(err.code(), ErrorCode::Io);
    }
}
