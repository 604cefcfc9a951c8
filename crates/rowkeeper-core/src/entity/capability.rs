//! Optional timestamp hooks run by the repository before persisting

use chrono::{Local, NaiveDateTime, Timelike};

/// Entities that stamp their creation time on insert
pub trait SupportsCreatedAt {
    fn mark_created_at(&mut self);
}

/// Entities that stamp their modification time on update
pub trait SupportsUpdatedAt {
    fn mark_updated_at(&mut self);
}

/// Local wall-clock time truncated to whole seconds
///
/// Storage formats carry second precision, so anything finer would show up
/// as a spurious change after the next load.
pub fn current_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
