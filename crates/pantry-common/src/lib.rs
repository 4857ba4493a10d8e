//! # pantry-common
//!
//! Common types, errors, and configuration for Pantry.
//!
//! This crate provides the foundational types used across all Pantry
//! components:
//!
//! - **Types**: the dynamic [`Value`] scalar, positional [`Row`], and
//!   [`Table`] — the tabular result exchanged with presentation code
//! - **Errors**: unified error handling with [`PantryError`]
//! - **Config**: the dataset registry configuration
//!
//! ## Example
//!
//! ```rust
//! use pantry_common::{PantryResult, Row, Table, Value};
//!
//! fn example() -> PantryResult<Table> {
//!     let mut table = Table::empty(vec!["Provider_ID".into(), "Name".into()]);
//!     table.push_row(Row::new(vec![Value::Integer(1), Value::text("Fresh Farm")]))?;
//!     Ok(table)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{BackendLocation, DatasetConfig, RegistryConfig};
pub use error::{ErrorCode, PantryError, PantryResult};
pub use types::{Row, Table, Value};
