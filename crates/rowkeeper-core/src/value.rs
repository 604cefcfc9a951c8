//! Property values, ordered value maps and storage rows

use crate::errors::{OrmError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A storage row: column name to raw value, `None` for SQL NULL
pub type Row = BTreeMap<String, Option<String>>;

/// A single property value
///
/// `Null`, `Int`, `Float`, `Bool` and `Text` are scalars and can be written
/// to storage as they are. Temporal values need a typer to become text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::Text(_)
        )
    }

    /// Whether the value counts as "not set" for inserts
    ///
    /// Null, empty text, `false` and `0.0` are empty. The integer `0` and the
    /// text `"0"` are not.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::Bool(b) => !*b,
            Value::Float(f) => *f == 0.0,
            _ => false,
        }
    }

    /// Short name of the variant, used in conversion errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Borrow the text if this is a `Text` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical storage text, `None` for `Null`
    pub fn to_raw(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Date(d) => Some(d.format(DATE_FORMAT).to_string()),
            Value::Time(t) => Some(t.format(TIME_FORMAT).to_string()),
            Value::DateTime(dt) => Some(dt.format(DATETIME_FORMAT).to_string()),
        }
    }

    /// Convert into an optional typed value, mapping `Null` to `None`
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when the value cannot be converted to `T`.
    pub fn into_opt<T>(self) -> Result<Option<T>>
    where
        T: TryFrom<Value, Error = OrmError>,
    {
        match self {
            Value::Null => Ok(None),
            other => T::try_from(other).map(Some),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_raw() {
            Some(raw) => f.write_str(&raw),
            None => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl TryFrom<Value> for i64 {
    type Error = OrmError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Text(ref s) => s
                .parse::<i64>()
                .map_err(|_| OrmError::type_mismatch(s.as_str(), "integer")),
            other => Err(OrmError::type_mismatch(other.to_string(), "integer")),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = OrmError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            Value::Text(ref s) => s
                .parse::<f64>()
                .map_err(|_| OrmError::type_mismatch(s.as_str(), "float")),
            other => Err(OrmError::type_mismatch(other.to_string(), "float")),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = OrmError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Text(ref s) if s == "0" => Ok(false),
            Value::Text(ref s) if s == "1" => Ok(true),
            other => Err(OrmError::type_mismatch(other.to_string(), "boolean")),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = OrmError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null => Err(OrmError::type_mismatch("NULL", "text")),
            other => Ok(other.to_string()),
        }
    }
}

impl TryFrom<Value> for NaiveDate {
    type Error = OrmError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Date(d) => Ok(d),
            Value::Text(ref s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|_| OrmError::type_mismatch(s.as_str(), "date")),
            other => Err(OrmError::type_mismatch(other.to_string(), "date")),
        }
    }
}

impl TryFrom<Value> for NaiveTime {
    type Error = OrmError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Time(t) => Ok(t),
            Value::Text(ref s) => NaiveTime::parse_from_str(s, TIME_FORMAT)
                .map_err(|_| OrmError::type_mismatch(s.as_str(), "time")),
            other => Err(OrmError::type_mismatch(other.to_string(), "time")),
        }
    }
}

impl TryFrom<Value> for NaiveDateTime {
    type Error = OrmError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Text(ref s) => NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .map_err(|_| OrmError::type_mismatch(s.as_str(), "datetime")),
            other => Err(OrmError::type_mismatch(other.to_string(), "datetime")),
        }
    }
}

/// Insertion-ordered map of property or column name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: Vec<(String, Value)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its original position
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &Value) -> bool,
    {
        self.entries.retain(|(k, v)| keep(k, v));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Into<String>, const N: usize> From<[(K, Value); N]> for ValueMap {
    fn from(entries: [(K, Value); N]) -> Self {
        entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_empty() {
        assert!(!Value::Int(0).is_empty());
        assert!(!Value::Text("0".to_string()).is_empty());
        assert!(Value::Null.is_empty());
        assert!(Value::Text(String::new()).is_empty());
        assert!(Value::Bool(false).is_empty());
        assert!(Value::Float(0.0).is_empty());
        assert!(!Value::Bool(true).is_empty());
    }

    #[test]
    fn test_temporal_values_are_not_scalar() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert!(!Value::Date(date).is_scalar());
        assert!(Value::Null.is_scalar());
        assert!(Value::Text("x".into()).is_scalar());
    }

    #[test]
    fn test_to_raw_renders_storage_text() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(9, 3, 0)
            .unwrap();
        assert_eq!(Value::Bool(true).to_raw().as_deref(), Some("1"));
        assert_eq!(Value::Int(-4).to_raw().as_deref(), Some("-4"));
        assert_eq!(
            Value::DateTime(dt).to_raw().as_deref(),
            Some("2024-01-05 09:03:00")
        );
        assert_eq!(Value::Null.to_raw(), None);
    }

    #[test]
    fn test_lenient_conversions() {
        assert_eq!(i64::try_from(Value::Text("42".into())).unwrap(), 42);
        assert!(bool::try_from(Value::Text("1".into())).unwrap());
        assert_eq!(String::try_from(Value::Int(7)).unwrap(), "7");
        assert!(i64::try_from(Value::Text("4x".into())).is_err());
        assert!(bool::try_from(Value::Int(2)).is_err());
    }

    #[test]
    fn test_into_opt_maps_null_to_none() {
        assert_eq!(Value::Null.into_opt::<i64>().unwrap(), None);
        assert_eq!(Value::Int(3).into_opt::<i64>().unwrap(), Some(3));
    }

    #[test]
    fn test_value_map_keeps_insertion_order() {
        let mut map = ValueMap::new();
        map.insert("name", Value::from("Ann"));
        map.insert("id", Value::Null);
        map.insert("name", Value::from("Bob"));

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["name", "id"]);
        assert_eq!(map.get("name"), Some(&Value::from("Bob")));
        assert_eq!(map.remove("id"), Some(Value::Null));
        assert_eq!(map.len(), 1);
    }
}
