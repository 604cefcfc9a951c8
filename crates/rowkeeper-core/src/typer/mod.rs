//! Property typers: per-property codecs between storage text and values
//!
//! A typer converts the raw string read from storage into a richer
//! [`Value`] and back. The round trip `untype(type(x)) == x` holds for every
//! raw string a typer accepts; anything outside its domain is rejected with
//! `TypeMismatch` rather than truncated.

pub mod builtin;
pub mod caster;
pub mod determiner;

pub use builtin::{BooleanTyper, DateTimeTyper, DateTyper, IntegerTyper, TimeTyper};
pub use caster::TypeCaster;
pub use determiner::PropertyTypeDeterminer;

use crate::errors::Result;
use crate::value::Value;
use std::fmt;

/// Bidirectional codec for a single property
///
/// Implementations are stateless and shared by every instance of an entity
/// type through its descriptor.
pub trait PropertyTyper: fmt::Debug + Send + Sync {
    /// Convert a raw storage string into a value
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when `raw` is outside the typer's domain.
    fn type_value(&self, raw: &str) -> Result<Value>;

    /// Convert a value back into its raw storage string
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when `value` is not of the typer's kind.
    fn untype_value(&self, value: &Value) -> Result<String>;
}
