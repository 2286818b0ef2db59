//! # Document Values
//!
//! [`Value`] is the in-memory form of a document field. It is a superset of
//! JSON: validation coerces date and datetime strings into [`Value::Date`]
//! and [`Value::DateTime`], and the persisted buffer form into
//! [`Value::Buffer`] for fields declared `buffer`. JSON loading itself is
//! purely structural.
//!
//! Persisted form (see [`Value::to_json`]):
//!
//! | Value      | JSON                                   |
//! |------------|----------------------------------------|
//! | `Date`     | `"YYYY-MM-DD"`                         |
//! | `DateTime` | RFC 3339 UTC string, millisecond precision |
//! | `Buffer`   | `{"type": "Buffer", "data": [bytes]}`  |
//! | `Number`   | integer when integral, float otherwise |

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::json;

use docmodel_core::{format_datetime, DateOnly};

/// A document body: field name to value.
pub type Fields = BTreeMap<String, Value>;

/// Largest magnitude at which every integer is exactly representable in an `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A document field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(f64),
    /// Text.
    String(String),
    /// Calendar date.
    Date(DateOnly),
    /// Instant in UTC.
    DateTime(DateTime<Utc>),
    /// Raw bytes.
    Buffer(Vec<u8>),
    /// Sequence.
    Array(Vec<Value>),
    /// Nested document.
    Object(Fields),
}

impl Value {
    /// Runtime type name, substituted for `%t%` in failure templates.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Buffer(_) => "buffer",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Whether this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The text, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The nested document, if this is an object.
    pub fn as_object(&self) -> Option<&Fields> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// The bytes of an object in persisted buffer form,
    /// `{"type": "Buffer", "data": [..]}`. `None` for anything else,
    /// including out-of-range bytes.
    pub fn decode_buffer(&self) -> Option<Vec<u8>> {
        let fields = self.as_object()?;
        if fields.len() != 2 || fields.get("type").and_then(Value::as_str) != Some("Buffer") {
            return None;
        }
        fields
            .get("data")?
            .as_array()?
            .iter()
            .map(|b| {
                b.as_f64()
                    .filter(|n| n.fract() == 0.0 && (0.0..=255.0).contains(n))
                    .map(|n| n as u8)
            })
            .collect()
    }

    /// Convert a JSON value structurally.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Object(fields_from_json(map)),
        }
    }

    /// Persisted JSON form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Date(d) => serde_json::Value::String(d.to_iso8601()),
            Self::DateTime(dt) => serde_json::Value::String(format_datetime(dt)),
            Self::Buffer(bytes) => json!({ "type": "Buffer", "data": bytes }),
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Object(fields) => serde_json::Value::Object(fields_to_json(fields)),
        }
    }
}

/// Convert a JSON object into document fields.
pub fn fields_from_json(map: serde_json::Map<String, serde_json::Value>) -> Fields {
    map.into_iter().map(|(k, v)| (k, Value::from_json(v))).collect()
}

/// Convert document fields into a JSON object.
pub fn fields_to_json(fields: &Fields) -> serde_json::Map<String, serde_json::Value> {
    fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
}

fn number_to_json(n: f64) -> serde_json::Value {
    if is_integral(n) {
        json!(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Human rendering, substituted for `%v%` in failure templates.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if is_integral(*n) => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => f.write_str(&format_datetime(dt)),
            Self::Buffer(bytes) => write!(f, "<Buffer {} bytes>", bytes.len()),
            Self::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Object(fields) => {
                write!(f, "{}", serde_json::Value::Object(fields_to_json(fields)))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<DateOnly> for Value {
    fn from(d: DateOnly) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Self::Object(fields)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::from_json(value)
    }
}
