//! Column/value pairs for INSERT and UPDATE bodies

use crate::entity::Entity;
use crate::errors::Result;
use crate::value::{Value, ValueMap};

/// Which statement a value set is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSetMode {
    /// Every non-empty value
    Insert,
    /// Only values that changed since the last snapshot
    Update,
}

/// Ordered column/value pairs destined for one row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet {
    values: ValueMap,
}

impl ValueSet {
    pub fn new(values: ValueMap) -> Self {
        Self { values }
    }

    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }
}

impl From<ValueMap> for ValueSet {
    fn from(values: ValueMap) -> Self {
        Self::new(values)
    }
}

/// Derives the value set to persist for an entity
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSetBuilder;

impl ValueSetBuilder {
    /// Build the value set for `entity`; the primary key is never included
    ///
    /// # Errors
    ///
    /// Propagates `TypeMismatch` from the entity's typers.
    pub fn build<E: Entity>(
        &self,
        primary_key: &str,
        entity: &E,
        mode: ValueSetMode,
    ) -> Result<ValueSet> {
        let mut values = match mode {
            ValueSetMode::Insert => entity.to_map_without_empty_values()?,
            ValueSetMode::Update => entity.to_map_changed_only()?,
        };
        values.remove(primary_key);
        Ok(ValueSet::new(values))
    }
}
