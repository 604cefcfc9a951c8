use crate::value::{Value, ValueMap};

/// Last-persisted values of an entity
///
/// Empty and unmarked until the entity is confirmed to come from storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginalSnapshot {
    values: ValueMap,
    marked: bool,
}

impl OriginalSnapshot {
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.values.get(property)
    }

    /// Replace the snapshot and mark it
    pub fn record(&mut self, values: ValueMap) {
        self.values = values;
        self.marked = true;
    }

    /// Forget the snapshot; the entity counts as transient again
    pub fn clear(&mut self) {
        self.values = ValueMap::new();
        self.marked = false;
    }
}
