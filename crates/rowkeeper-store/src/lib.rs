//! Rowkeeper Store - SQLite connection and configuration
//!
//! Provides:
//! - `SqliteDatabase`, a rusqlite-backed [`rowkeeper_core::Database`]
//! - `DatabaseConfig`, TOML connection settings with redacted credentials
//! - Helpers for converting driver and IO failures into `OrmError`

pub mod config;
pub mod db;
pub mod errors;

// Re-export key types
pub use config::DatabaseConfig;
pub use db::SqliteDatabase;
pub use errors::Result;
