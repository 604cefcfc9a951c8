//! Error handling for rowkeeper-store
//!
//! Everything surfaces as `rowkeeper_core::OrmError`; these helpers pick the
//! variant.

use rowkeeper_core::errors::OrmError;

/// Result type alias using OrmError
pub type Result<T> = std::result::Result<T, OrmError>;

/// Create a connection error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> OrmError {
    OrmError::Connection {
        message: err.to_string(),
    }
}

/// Create a configuration error
pub fn config_error(reason: impl Into<String>) -> OrmError {
    OrmError::Config {
        reason: reason.into(),
    }
}

/// Create a configuration error from a failed file operation
pub fn io_error(operation: &str, err: std::io::Error) -> OrmError {
    config_error(format!("{}: {}", operation, err))
}
