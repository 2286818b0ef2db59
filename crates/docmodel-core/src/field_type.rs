//! # Declared Field Types
//!
//! Defines the single `FieldType` enum used by the structural checker, the
//! validation engine, and the emitter, together with the shorthand names a
//! description file may use instead of a full field descriptor.
//!
//! ## Shorthands
//!
//! | Shorthand    | Type       | Required |
//! |--------------|------------|----------|
//! | `string`     | `string`   | yes      |
//! | `optstring`  | `string`   | no       |
//! | `boolean`    | `boolean`  | yes      |
//! | `optboolean` | `boolean`  | no       |
//! | `number`     | `number`   | yes      |
//! | `date`       | `date`     | yes      |
//! | `datetime`   | `datetime` | yes      |
//! | `timestamp`  | `timestamp`| yes      |
//!
//! Shorthand matching is case-insensitive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Field names that no schema may declare, with the reason each is refused.
///
/// `get`/`set`/`doctype__` collide with model members, `_id` is supplied by
/// the document store itself, and `id` is too easily confused with `_id`.
pub const RESERVED_FIELD_NAMES: &[(&str, &str)] = &[
    ("get", "reserved keyword"),
    ("set", "reserved keyword"),
    ("doctype__", "reserved keyword"),
    ("_id", "the document store already supplies '_id'"),
    ("id", "the document store already has an '_id' field; 'id' is ambiguous"),
];

/// Check that `name` is usable as a field name.
///
/// # Errors
///
/// Returns [`CoreError::InvalidFieldName`] for reserved names and for names
/// with a leading underscore (the document store reserves those).
pub fn check_field_name(name: &str) -> Result<(), CoreError> {
    let reserved = RESERVED_FIELD_NAMES
        .iter()
        .find(|(reserved, _)| *reserved == name)
        .map(|(_, reason)| *reason);
    let reason = match reserved {
        Some(reason) => Some(reason),
        None if name.starts_with('_') => {
            Some("leading underscores are reserved by the document store")
        }
        None if name.is_empty() => Some("field names must not be empty"),
        None => None,
    };
    match reason {
        Some(reason) => Err(CoreError::InvalidFieldName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// The declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 text.
    String,
    /// `true` / `false`.
    Boolean,
    /// Numeric value (IEEE-754 double).
    Number,
    /// Calendar date without time; stored as `YYYY-MM-DD`.
    Date,
    /// Instant in time; stored as RFC 3339 UTC.
    #[serde(rename = "datetime")]
    DateTime,
    /// Instant in time recorded by the system; same value domain as `datetime`.
    Timestamp,
    /// Raw bytes.
    Buffer,
    /// Nested document governed by another schema.
    Subschema,
    /// Computed from other fields; never persisted, never validated.
    Calculated,
}

impl FieldType {
    /// All declared types, in declaration order.
    pub const ALL: [FieldType; 9] = [
        FieldType::String,
        FieldType::Boolean,
        FieldType::Number,
        FieldType::Date,
        FieldType::DateTime,
        FieldType::Timestamp,
        FieldType::Buffer,
        FieldType::Subschema,
        FieldType::Calculated,
    ];

    /// The type name as it appears in description files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Buffer => "buffer",
            Self::Subschema => "subschema",
            Self::Calculated => "calculated",
        }
    }

    /// Name of the value type a field of this type holds.
    ///
    /// Substituted for `%S%` in validation failure templates.
    pub fn constructor_name(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Number => "Number",
            Self::Date => "DateOnly",
            Self::DateTime | Self::Timestamp => "Date",
            Self::Buffer => "Buffer",
            Self::Subschema => "Object",
            Self::Calculated => "Function",
        }
    }

    /// Whether the type refers to another schema.
    pub fn is_subschema(&self) -> bool {
        matches!(self, Self::Subschema)
    }

    /// Whether the field is stored in documents.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, Self::Calculated)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| CoreError::UnknownFieldType(s.to_string()))
    }
}

/// A shorthand type name accepted in place of a full field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shorthand {
    /// Required string.
    String,
    /// Optional string.
    OptString,
    /// Required boolean.
    Boolean,
    /// Optional boolean.
    OptBoolean,
    /// Required number.
    Number,
    /// Required date.
    Date,
    /// Required datetime.
    DateTime,
    /// Required timestamp.
    Timestamp,
}

impl Shorthand {
    /// All shorthands.
    pub const ALL: [Shorthand; 8] = [
        Shorthand::String,
        Shorthand::OptString,
        Shorthand::Boolean,
        Shorthand::OptBoolean,
        Shorthand::Number,
        Shorthand::Date,
        Shorthand::DateTime,
        Shorthand::Timestamp,
    ];

    /// Parse a shorthand name, ignoring ASCII case.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|sh| sh.as_str() == lower)
    }

    /// The shorthand as written in description files (lowercase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::OptString => "optstring",
            Self::Boolean => "boolean",
            Self::OptBoolean => "optboolean",
            Self::Number => "number",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
        }
    }

    /// The declared type the shorthand expands to.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::String | Self::OptString => FieldType::String,
            Self::Boolean | Self::OptBoolean => FieldType::Boolean,
            Self::Number => FieldType::Number,
            Self::Date => FieldType::Date,
            Self::DateTime => FieldType::DateTime,
            Self::Timestamp => FieldType::Timestamp,
        }
    }

    /// Whether the expanded descriptor is required.
    pub fn required(&self) -> bool {
        !matches!(self, Self::OptString | Self::OptBoolean)
    }
}
