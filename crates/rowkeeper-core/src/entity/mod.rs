//! Entities: in-memory records with change tracking
//!
//! An entity type declares its properties once through an
//! [`EntityDescriptor`]. Everything else (maps, change detection, hydration
//! from storage rows) is provided by the [`Entity`] trait on top of that
//! table.

pub mod capability;
pub mod descriptor;
pub mod snapshot;

pub use capability::{current_timestamp, SupportsCreatedAt, SupportsUpdatedAt};
pub use descriptor::{EntityDescriptor, EntityDescriptorBuilder, Getter, Property, Setter};
pub use snapshot::OriginalSnapshot;

use crate::errors::{OrmError, Result};
use crate::typer::PropertyTypeDeterminer;
use crate::value::{Row, Value, ValueMap};
use std::any::Any;

/// A record that maps to one table row
///
/// Implementors supply the descriptor and access to their snapshot; the
/// remaining methods have working defaults.
pub trait Entity: Default + 'static {
    /// The property table for this type, built once
    fn descriptor() -> &'static EntityDescriptor<Self>;

    fn original(&self) -> &OriginalSnapshot;

    fn original_mut(&mut self) -> &mut OriginalSnapshot;

    /// Creation timestamp hook, if the entity has one
    fn created_at_support(&mut self) -> Option<&mut dyn SupportsCreatedAt> {
        None
    }

    /// Modification timestamp hook, if the entity has one
    fn updated_at_support(&mut self) -> Option<&mut dyn SupportsUpdatedAt> {
        None
    }

    /// Read the primary key property
    ///
    /// # Errors
    ///
    /// `InvalidPrimaryKey` if `key` is not a declared property.
    fn get_primary_key_value(&self, key: &str) -> Result<Value> {
        let descriptor = Self::descriptor();
        descriptor
            .property(key)
            .map(|p| p.get(self))
            .ok_or_else(|| OrmError::InvalidPrimaryKey {
                entity: descriptor.name(),
                key: key.to_string(),
            })
    }

    /// Write the primary key property through its setter
    ///
    /// # Errors
    ///
    /// `InvalidPrimaryKey` if `key` is undeclared, `MissingSetter` if it is
    /// read-only, or whatever the setter itself rejects.
    fn set_primary_key_value(&mut self, key: &str, value: Value) -> Result<()> {
        let descriptor = Self::descriptor();
        let property = descriptor
            .property(key)
            .ok_or_else(|| OrmError::InvalidPrimaryKey {
                entity: descriptor.name(),
                key: key.to_string(),
            })?;
        let setter = property.setter().ok_or_else(|| OrmError::MissingSetter {
            entity: descriptor.name(),
            property: key.to_string(),
        })?;
        setter(self, value)
    }

    /// All scalar properties in storage form
    ///
    /// Typed properties are untyped first. Anything still non-scalar
    /// afterwards is left out.
    ///
    /// # Errors
    ///
    /// Propagates `TypeMismatch` from a typer.
    fn to_map(&self) -> Result<ValueMap> {
        let descriptor = Self::descriptor();
        let determiner = PropertyTypeDeterminer::default();
        let mut map = ValueMap::new();
        for property in descriptor.properties() {
            let value = determiner.untype_value::<Self>(property.name(), property.get(self))?;
            if value.is_scalar() {
                map.insert(property.name(), value);
            }
        }
        Ok(map)
    }

    /// # Errors
    ///
    /// Same as [`Entity::to_map`].
    fn to_map_without(&self, keys: &[&str]) -> Result<ValueMap> {
        let mut map = self.to_map()?;
        map.retain(|key, _| !keys.contains(&key));
        Ok(map)
    }

    /// `to_map()` without null, empty text, `false` and `0.0`
    ///
    /// # Errors
    ///
    /// Same as [`Entity::to_map`].
    fn to_map_without_empty_values(&self) -> Result<ValueMap> {
        let mut map = self.to_map()?;
        map.retain(|_, value| !value.is_empty());
        Ok(map)
    }

    /// Properties whose value differs from the snapshot
    ///
    /// # Errors
    ///
    /// Same as [`Entity::to_map`].
    fn to_map_changed_only(&self) -> Result<ValueMap> {
        let original = self.original();
        let mut map = self.to_map()?;
        map.retain(|key, value| original.get(key) != Some(value));
        Ok(map)
    }

    /// Record the current values as the persisted state
    ///
    /// # Errors
    ///
    /// Same as [`Entity::to_map`].
    fn mark_as_original(&mut self) -> Result<()> {
        let values = self.to_map()?;
        self.original_mut().record(values);
        Ok(())
    }

    fn has_been_marked_as_original(&self) -> bool {
        self.original().is_marked()
    }

    fn property_names() -> Vec<&'static str> {
        Self::descriptor().property_names().collect()
    }

    /// Build an entity from a storage row with the default determiner
    ///
    /// # Errors
    ///
    /// See [`Entity::from_storage_row_with`].
    fn from_storage_row(primary_key: &str, row: &Row) -> Result<Self> {
        Self::from_storage_row_with(primary_key, row, &PropertyTypeDeterminer::default())
    }

    /// Build an entity from a storage row
    ///
    /// The primary key is set first, then every other column through its
    /// setter. Null columns leave the property at its default. The result
    /// is marked as original.
    ///
    /// # Errors
    ///
    /// - `InvalidPrimaryKey` if `primary_key` is not declared
    /// - `MissingPrimaryKeyValue` if the row has no non-null value for it
    /// - `UnknownProperty` for a column with no matching property
    /// - `MissingSetter` for a column whose property is read-only
    /// - `TypeMismatch` from a typer or setter
    fn from_storage_row_with(
        primary_key: &str,
        row: &Row,
        determiner: &PropertyTypeDeterminer,
    ) -> Result<Self> {
        let descriptor = Self::descriptor();
        if !descriptor.has_property(primary_key) {
            return Err(OrmError::InvalidPrimaryKey {
                entity: descriptor.name(),
                key: primary_key.to_string(),
            });
        }

        let raw_key = row
            .get(primary_key)
            .and_then(|raw| raw.as_deref())
            .ok_or_else(|| OrmError::MissingPrimaryKeyValue {
                entity: descriptor.name(),
                key: primary_key.to_string(),
            })?;

        let mut entity = Self::default();
        let key = determiner.type_value::<Self>(primary_key, Some(raw_key))?;
        entity.set_primary_key_value(primary_key, key)?;

        for (column, raw) in row {
            if column == primary_key {
                continue;
            }
            let property =
                descriptor
                    .property(column)
                    .ok_or_else(|| OrmError::UnknownProperty {
                        entity: descriptor.name(),
                        property: column.clone(),
                    })?;
            let setter = property.setter().ok_or_else(|| OrmError::MissingSetter {
                entity: descriptor.name(),
                property: column.clone(),
            })?;
            let value = determiner.type_value::<Self>(column, raw.as_deref())?;
            if value.is_null() {
                continue;
            }
            setter(&mut entity, value)?;
        }

        entity.mark_as_original()?;
        Ok(entity)
    }
}

/// Type-erased entity access for callers that hold mixed entity types
pub trait AnyEntity: Any {
    fn entity_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: Entity> AnyEntity for E {
    fn entity_name(&self) -> &'static str {
        E::descriptor().name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
