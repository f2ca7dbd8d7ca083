//! Flat processed records
//!
//! The mapping phase projects each nested resource into a [`ProcessedRecord`]:
//! an ordered set of destination keys holding only scalar values. Records
//! never contain nested structures; key order is the mapping-table order, so
//! CSV headers and SQL column lists stay stable across runs.

use serde_json::Value;
use std::fmt;

/// A scalar destination value: text, number, or null
///
/// This is the full set of value shapes the structured zone accepts. Anything
/// else a source path resolves to (objects, arrays) is rejected during
/// mapping and lands here as `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Null,
}

impl FieldValue {
    /// Convert a resolved JSON scalar into a field value.
    ///
    /// Returns `None` for containers (objects and arrays), which violate the
    /// flat-record contract. Booleans are rare in the mapped fields and are
    /// carried as text.
    pub fn from_json(value: &Value) -> Option<FieldValue> {
        match value {
            Value::Null => Some(FieldValue::Null),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::Bool(b) => Some(FieldValue::Text(b.to_string())),
            Value::Object(_) | Value::Array(_) => None,
        }
    }

    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Null => Ok(()),
        }
    }
}

/// A flat record produced by the mapping phase
///
/// Keys are exactly the field spec's destination keys, in mapping-table
/// order, plus the `origin` provenance tag carried separately.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    origin: i32,
    fields: Vec<(String, FieldValue)>,
}

impl ProcessedRecord {
    /// Create an empty record with a provenance tag.
    pub fn new(origin: i32) -> Self {
        Self {
            origin,
            fields: Vec::new(),
        }
    }

    /// Source-system provenance tag.
    pub fn origin(&self) -> i32 {
        self.origin
    }

    /// Append a destination value. Keys arrive in mapping-table order and are
    /// unique by construction of the field spec.
    pub fn push(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.push((key.into(), value));
    }

    /// Look up a value by destination key.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Replace the value under an existing key. No-op if the key is absent.
    pub fn set(&mut self, key: &str, value: FieldValue) {
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        }
    }

    /// Text under a key, if present and textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// Number under a key, if present and numeric.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_number)
    }

    /// Destination keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Key/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
