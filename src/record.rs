//! Raw rows produced by a record source.
//!
//! A [`RawRecord`] is a flat map from dotted field paths (the same names the
//! query SELECT list uses, e.g. `metrics.cost_micros`) to loosely typed
//! values. Ownership model:
//!
//! - Sources build and own `RawRecord`s; the engine only borrows them during
//!   normalization and never mutates them.
//! - Coded fields may arrive as canonical enum names (REST-style transports)
//!   or as integer codes (protobuf-style transports); [`crate::enums::decode`]
//!   folds both into display strings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::FieldPath;

/// Loosely typed value of one raw field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text, dates, and enum names.
    Text(String),
    /// Ids, counters, and integer micros.
    Integer(i64),
    /// Fractional metrics such as impression shares and double micros.
    Float(f64),
    /// Resource-name lists, e.g. `campaign.labels`.
    TextList(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::TextList(value)
    }
}

/// One raw row as delivered by a source, keyed by field path.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: IndexMap<FieldPath, FieldValue>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value at the same path.
    pub fn set(&mut self, path: impl Into<FieldPath>, value: impl Into<FieldValue>) {
        self.fields.insert(path.into(), value.into());
    }

    /// Builder-style [`set`](Self::set), used heavily by fixtures.
    pub fn with(mut self, path: impl Into<FieldPath>, value: impl Into<FieldValue>) -> Self {
        self.set(path, value);
        self
    }

    /// Raw value at `path`, if present.
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.fields.get(path)
    }

    /// Text value at `path`; `None` for absent or non-text fields.
    pub fn text(&self, path: &str) -> Option<&str> {
        match self.get(path) {
            Some(FieldValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Text value at `path`, or the empty string.
    pub fn text_or_empty(&self, path: &str) -> String {
        self.text(path).unwrap_or_default().to_string()
    }

    /// Integer value at `path`. Text fields holding digits also parse, since
    /// some transports serialize INT64 columns as strings.
    pub fn integer(&self, path: &str) -> Option<i64> {
        match self.get(path) {
            Some(FieldValue::Integer(value)) => Some(*value),
            Some(FieldValue::Text(value)) => value.trim().parse().ok(),
            _ => None,
        }
    }

    /// Integer value at `path`, or zero.
    pub fn integer_or_zero(&self, path: &str) -> i64 {
        self.integer(path).unwrap_or(0)
    }

    /// Float value at `path`; integer fields widen.
    pub fn float(&self, path: &str) -> Option<f64> {
        match self.get(path) {
            Some(FieldValue::Float(value)) => Some(*value),
            Some(FieldValue::Integer(value)) => Some(*value as f64),
            Some(FieldValue::Text(value)) => value.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float value at `path`, or zero.
    pub fn float_or_zero(&self, path: &str) -> f64 {
        self.float(path).unwrap_or(0.0)
    }

    /// Boolean value at `path`, defaulting to `false`. Integer transports
    /// encode flags as 0/1, text transports as `true`/`false`.
    pub fn boolean_or_false(&self, path: &str) -> bool {
        match self.get(path) {
            Some(FieldValue::Integer(value)) => *value != 0,
            Some(FieldValue::Text(value)) => value.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Text list at `path`, or an empty slice.
    pub fn text_list(&self, path: &str) -> &[String] {
        match self.get(path) {
            Some(FieldValue::TextList(values)) => values.as_slice(),
            _ => &[],
        }
    }

    /// True when the record carries no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
