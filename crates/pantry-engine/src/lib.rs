//! # pantry-engine
//!
//! Generic CRUD operations and the aggregate query runner.
//!
//! The CRUD side is schema-agnostic: it operates on whatever columns the
//! loaded [`Table`](pantry_common::Table) declares, with no knowledge of
//! the backend variant beyond
//! [`supports_statements`](pantry_storage::StorageBackend::supports_statements).
//! The query side executes a fixed catalog of named, parameterized
//! aggregate definitions and returns tabular results.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod crud;
pub mod query;

pub use crud::{apply_add, apply_delete, apply_update, CrudEngine, FieldValues};
pub use query::{catalog, QueryDef, QueryRunner};
