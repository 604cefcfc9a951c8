//! Built-in typers for integers, booleans and temporal columns

use super::PropertyTyper;
use crate::errors::{OrmError, Result};
use crate::value::{Value, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Decimal integer columns
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerTyper;

impl PropertyTyper for IntegerTyper {
    fn type_value(&self, raw: &str) -> Result<Value> {
        // Only the canonical rendering is accepted, so "007" and "+7" fail.
        match raw.parse::<i64>() {
            Ok(i) if i.to_string() == raw => Ok(Value::Int(i)),
            _ => Err(OrmError::type_mismatch(raw, "integer")),
        }
    }

    fn untype_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Int(i) => Ok(i.to_string()),
            other => Err(OrmError::type_mismatch(other.to_string(), "integer")),
        }
    }
}

/// `1`/`0` flag columns
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanTyper;

impl PropertyTyper for BooleanTyper {
    fn type_value(&self, raw: &str) -> Result<Value> {
        match raw {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            _ => Err(OrmError::type_mismatch(raw, "boolean")),
        }
    }

    fn untype_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Bool(true) => Ok("1".to_string()),
            Value::Bool(false) => Ok("0".to_string()),
            other => Err(OrmError::type_mismatch(other.to_string(), "boolean")),
        }
    }
}

/// `YYYY-MM-DD` columns
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTyper;

impl PropertyTyper for DateTyper {
    fn type_value(&self, raw: &str) -> Result<Value> {
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .filter(|d| d.format(DATE_FORMAT).to_string() == raw)
            .map(Value::Date)
            .ok_or_else(|| OrmError::type_mismatch(raw, "date"))
    }

    fn untype_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Date(d) => Ok(d.format(DATE_FORMAT).to_string()),
            Value::DateTime(dt) => Ok(dt.format(DATE_FORMAT).to_string()),
            other => Err(OrmError::type_mismatch(other.to_string(), "date")),
        }
    }
}

/// `HH:MM:SS` columns
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeTyper;

impl PropertyTyper for TimeTyper {
    fn type_value(&self, raw: &str) -> Result<Value> {
        NaiveTime::parse_from_str(raw, TIME_FORMAT)
            .ok()
            .filter(|t| t.format(TIME_FORMAT).to_string() == raw)
            .map(Value::Time)
            .ok_or_else(|| OrmError::type_mismatch(raw, "time"))
    }

    fn untype_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Time(t) => Ok(t.format(TIME_FORMAT).to_string()),
            Value::DateTime(dt) => Ok(dt.format(TIME_FORMAT).to_string()),
            other => Err(OrmError::type_mismatch(other.to_string(), "time")),
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS` columns
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeTyper;

impl PropertyTyper for DateTimeTyper {
    fn type_value(&self, raw: &str) -> Result<Value> {
        NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
            .ok()
            .filter(|dt| dt.format(DATETIME_FORMAT).to_string() == raw)
            .map(Value::DateTime)
            .ok_or_else(|| OrmError::type_mismatch(raw, "datetime"))
    }

    fn untype_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::DateTime(dt) => Ok(dt.format(DATETIME_FORMAT).to_string()),
            other => Err(OrmError::type_mismatch(other.to_string(), "datetime")),
        }
    }
}
