//! Rowkeeper Core - entity mapping and persistence engine
//!
//! This crate provides:
//! - A value model and per-property typers for converting storage text
//! - Entities with change tracking against a persisted snapshot
//! - Value sets for INSERT/UPDATE bodies
//! - A minimal SQL statement model with a MySQL/SQLite renderer
//! - Repositories with save/delete lifecycles and deferred batches
//! - A transaction wrapper
//!
//! Connections are supplied through the [`Database`] trait; the
//! `rowkeeper-store` crate provides a SQLite implementation.

pub mod database;
pub mod entity;
pub mod errors;
pub mod logging_facility;
pub mod query;
pub mod repository;
pub mod transaction;
pub mod typer;
pub mod value;
pub mod value_set;

// Re-export commonly used types
pub use database::Database;
pub use entity::{
    AnyEntity, Entity, EntityDescriptor, OriginalSnapshot, SupportsCreatedAt, SupportsUpdatedAt,
};
pub use errors::{OrmError, OrmErrorKind, Result};
pub use query::{Builder, Dialect, Operator, OrderBy, Query};
pub use repository::{FindOptions, Repository, SaveOutcome};
pub use transaction::Transaction;
pub use typer::{PropertyTypeDeterminer, PropertyTyper, TypeCaster};
pub use value::{Row, Value, ValueMap};
pub use value_set::{ValueSet, ValueSetBuilder, ValueSetMode};
