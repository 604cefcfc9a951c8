//! Boundary logging macros
//!
//! Field names come from `rowkeeper_core_types::schema` so every crate emits
//! the same keys.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use rowkeeper_core::log_op_start;
/// log_op_start!("repository_save");
/// log_op_start!("repository_save", table = "users");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowkeeper_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowkeeper_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use rowkeeper_core::log_op_end;
/// log_op_end!("repository_save", duration_ms = 3);
/// log_op_end!("repository_save", duration_ms = 3, outcome = "inserted");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowkeeper_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowkeeper_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}
