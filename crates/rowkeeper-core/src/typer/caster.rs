//! Best-effort inference for columns without a typer

use crate::value::{Value, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

/// Guesses a value type from a raw storage string
///
/// Disabled by default; when disabled every raw string stays `Text`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TypeCaster {
    enabled: bool,
}

impl TypeCaster {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled() -> Self {
        Self::new(true)
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Infer a value for `raw`
    ///
    /// Plain integers without a leading zero become `Int`. Other numerics
    /// (fractions, zero-padded codes) stay `Text` so nothing is lost.
    /// Canonical date, time and datetime strings become temporal values.
    pub fn cast(&self, raw: &str) -> Value {
        if !self.enabled {
            return Value::Text(raw.to_string());
        }

        if is_plain_integer(raw) {
            if let Ok(i) = raw.parse::<i64>() {
                return Value::Int(i);
            }
        }

        if let Some(value) = cast_temporal(raw) {
            return value;
        }

        Value::Text(raw.to_string())
    }
}

fn is_plain_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    raw == "0" || !digits.starts_with('0')
}

fn cast_temporal(raw: &str) -> Option<Value> {
    match raw.len() {
        10 => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .filter(|d| d.format(DATE_FORMAT).to_string() == raw)
            .map(Value::Date),
        8 => NaiveTime::parse_from_str(raw, TIME_FORMAT)
            .ok()
            .filter(|t| t.format(TIME_FORMAT).to_string() == raw)
            .map(Value::Time),
        19 => NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
            .ok()
            .filter(|dt| dt.format(DATETIME_FORMAT).to_string() == raw)
            .map(Value::DateTime),
        _ => None,
    }
}
