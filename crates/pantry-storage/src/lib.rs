//! # pantry-storage
//!
//! Storage backends and the dataset registry.
//!
//! A dataset is a logical named table exposed uniformly regardless of
//! physical storage. This crate implements:
//!
//! - the [`StorageBackend`] contract every backend satisfies
//! - [`CsvBackend`]: delimited text files, header row = schema
//! - [`SqliteBackend`]: tables in one shared SQLite database
//! - [`TableRegistry`]: the immutable name → backend mapping
//!
//! Callers must not need to know which variant they are talking to; the
//! only observable difference is [`StorageBackend::supports_statements`],
//! which selects keyed-statement persistence over whole-table saves.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod csv;
pub mod registry;
pub mod sqlite;

pub use backend::{Statement, StorageBackend};
pub use csv::CsvBackend;
pub use registry::TableRegistry;
pub use sqlite::SqliteBackend;
