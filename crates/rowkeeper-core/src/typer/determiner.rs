//! Resolves the typer for an entity property and applies it

use super::caster::TypeCaster;
use crate::entity::Entity;
use crate::errors::Result;
use crate::value::Value;

/// Applies an entity's registered typers, falling back to the caster
///
/// Properties without a typer pass through unchanged unless the caster was
/// explicitly enabled, in which case raw strings are inferred on the way in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyTypeDeterminer {
    caster: TypeCaster,
}

impl PropertyTypeDeterminer {
    pub fn new(caster: TypeCaster) -> Self {
        Self { caster }
    }

    pub fn caster(&self) -> TypeCaster {
        self.caster
    }

    /// Convert a raw storage value for `property` of `E`
    ///
    /// # Errors
    ///
    /// Propagates `TypeMismatch` from the property's typer.
    pub fn type_value<E: Entity>(&self, property: &str, raw: Option<&str>) -> Result<Value> {
        let Some(raw) = raw else {
            return Ok(Value::Null);
        };
        match E::descriptor().typer(property) {
            Some(typer) => typer.type_value(raw),
            None => Ok(self.caster.cast(raw)),
        }
    }

    /// Convert a property value of `E` back to its storage form
    ///
    /// Typed properties always come back as `Text`; null stays null.
    ///
    /// # Errors
    ///
    /// Propagates `TypeMismatch` from the property's typer.
    pub fn untype_value<E: Entity>(&self, property: &str, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match E::descriptor().typer(property) {
            Some(typer) => typer.untype_value(&value).map(Value::Text),
            None => Ok(value),
        }
    }
}
