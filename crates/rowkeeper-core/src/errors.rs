use thiserror::Error;

/// Result type alias using OrmError
pub type Result<T> = std::result::Result<T, OrmError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// depending on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrmErrorKind {
    // Entity mapping
    InvalidPrimaryKey,
    MissingPrimaryKeyValue,
    UnknownProperty,
    MissingSetter,
    TypeMismatch,

    // Repository
    EntityTypeMismatch,
    CannotDeleteUnstored,
    MultipleResultsFound,
    NotConnected,

    // Transaction
    NestedTransaction,
    NoActiveTransaction,
    TransactionFailed,

    // Integration/IO
    Connection,
    InvalidQuery,
    Config,
}

impl OrmErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            OrmErrorKind::InvalidPrimaryKey => "ERR_INVALID_PRIMARY_KEY",
            OrmErrorKind::MissingPrimaryKeyValue => "ERR_MISSING_PRIMARY_KEY_VALUE",
            OrmErrorKind::UnknownProperty => "ERR_UNKNOWN_PROPERTY",
            OrmErrorKind::MissingSetter => "ERR_MISSING_SETTER",
            OrmErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            OrmErrorKind::EntityTypeMismatch => "ERR_ENTITY_TYPE_MISMATCH",
            OrmErrorKind::CannotDeleteUnstored => "ERR_CANNOT_DELETE_UNSTORED",
            OrmErrorKind::MultipleResultsFound => "ERR_MULTIPLE_RESULTS_FOUND",
            OrmErrorKind::NotConnected => "ERR_NOT_CONNECTED",
            OrmErrorKind::NestedTransaction => "ERR_NESTED_TRANSACTION",
            OrmErrorKind::NoActiveTransaction => "ERR_NO_ACTIVE_TRANSACTION",
            OrmErrorKind::TransactionFailed => "ERR_TRANSACTION_FAILED",
            OrmErrorKind::Connection => "ERR_CONNECTION",
            OrmErrorKind::InvalidQuery => "ERR_INVALID_QUERY",
            OrmErrorKind::Config => "ERR_CONFIG",
        }
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for mapping, persistence and transaction operations
#[derive(Error, Debug)]
pub enum OrmError {
    // ===== Entity Mapping Errors =====
    /// The named primary key is not a declared property
    #[error("Primary key property '{key}' does not exist on entity {entity}")]
    InvalidPrimaryKey { entity: &'static str, key: String },

    /// A storage row did not carry a value for the primary key
    #[error("Could not set primary key '{key}' on entity {entity}: row has no value for it")]
    MissingPrimaryKeyValue { entity: &'static str, key: String },

    /// A storage column has no matching property
    #[error("Property '{property}' does not exist on entity {entity}")]
    UnknownProperty {
        entity: &'static str,
        property: String,
    },

    /// The property is declared read-only
    #[error("Setter for property '{property}' not defined on entity {entity}")]
    MissingSetter {
        entity: &'static str,
        property: String,
    },

    /// A value could not be converted by a typer or accessor
    #[error("Could not convert '{value}' to {target}")]
    TypeMismatch { value: String, target: &'static str },

    // ===== Repository Errors =====
    /// A type-erased entity did not match the repository's entity type
    #[error("Expected entity {expected}, got {actual} instead")]
    EntityTypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Deleting an entity that was never persisted
    #[error("Cannot delete {entity} that is not stored")]
    CannotDeleteUnstored { entity: &'static str },

    /// A unique lookup matched more than one row
    #[error("Found {count} rows of {entity} where at most one was expected")]
    MultipleResultsFound { entity: &'static str, count: usize },

    /// The database reports no open connection
    #[error("Cannot use repository methods without a database connection")]
    NotConnected,

    // ===== Transaction Errors =====
    #[error("Cannot start a transaction within a transaction")]
    NestedTransaction,

    #[error("Cannot {op} while not in a transaction")]
    NoActiveTransaction { op: &'static str },

    /// The transactional action failed and the transaction was rolled back
    #[error("Transaction rolled back: {source}")]
    TransactionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ===== Generic Errors =====
    /// Driver-level failure
    #[error("Database error: {message}")]
    Connection { message: String },

    /// A query could not be rendered
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// Configuration could not be loaded or validated
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl OrmError {
    /// Get the error kind
    pub fn kind(&self) -> OrmErrorKind {
        match self {
            OrmError::InvalidPrimaryKey { .. } => OrmErrorKind::InvalidPrimaryKey,
            OrmError::MissingPrimaryKeyValue { .. } => OrmErrorKind::MissingPrimaryKeyValue,
            OrmError::UnknownProperty { .. } => OrmErrorKind::UnknownProperty,
            OrmError::MissingSetter { .. } => OrmErrorKind::MissingSetter,
            OrmError::TypeMismatch { .. } => OrmErrorKind::TypeMismatch,
            OrmError::EntityTypeMismatch { .. } => OrmErrorKind::EntityTypeMismatch,
            OrmError::CannotDeleteUnstored { .. } => OrmErrorKind::CannotDeleteUnstored,
            OrmError::MultipleResultsFound { .. } => OrmErrorKind::MultipleResultsFound,
            OrmError::NotConnected => OrmErrorKind::NotConnected,
            OrmError::NestedTransaction => OrmErrorKind::NestedTransaction,
            OrmError::NoActiveTransaction { .. } => OrmErrorKind::NoActiveTransaction,
            OrmError::TransactionFailed { .. } => OrmErrorKind::TransactionFailed,
            OrmError::Connection { .. } => OrmErrorKind::Connection,
            OrmError::InvalidQuery { .. } => OrmErrorKind::InvalidQuery,
            OrmError::Config { .. } => OrmErrorKind::Config,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Shorthand for a `TypeMismatch` error
    pub fn type_mismatch(value: impl Into<String>, target: &'static str) -> Self {
        OrmError::TypeMismatch {
            value: value.into(),
            target,
        }
    }
}
