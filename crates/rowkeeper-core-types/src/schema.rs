//! Canonical schema constants for structured logging
//!
//! These constants keep field names consistent between the repository,
//! the transaction wrapper and the store.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Persistence identifiers
pub const FIELD_TABLE: &str = "table";
pub const FIELD_ENTITY: &str = "entity";
pub const FIELD_SQL: &str = "sql";

// Collection sizes
pub const FIELD_ROW_COUNT: &str = "row_count";
pub const FIELD_BATCH_LEN: &str = "batch_len";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
