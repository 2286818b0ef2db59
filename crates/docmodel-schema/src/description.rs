//! # Schema Descriptions
//!
//! A [`SchemaDescription`] is one parsed, structurally checked description
//! file:
//!
//! ```json
//! {
//!   "name": "Person",
//!   "version": 1,
//!   "fields": {
//!     "name": "string",
//!     "age": { "type": "number", "required": false, "min": 0, "max": 150 },
//!     "address": { "type": "subschema", "schema": "Address" }
//!   }
//! }
//! ```
//!
//! Field order is the declaration order of the source object and is kept
//! for the lifetime of the description, so error lists produced from it
//! are reproducible.

use serde_json::Value;

use crate::descriptor::{normalize_field, FieldSpec, RawField};
use crate::error::GeneratorError;

/// One schema as loaded from a description file.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescription {
    /// Unique schema name.
    pub name: String,
    /// Current on-disk shape version.
    pub version: u32,
    /// Where the description came from (file path or label).
    pub origin: String,
    /// Normalized fields in declaration order.
    pub fields: Vec<(String, FieldSpec)>,
    /// Names of referenced subschemas, filled in by resolution.
    pub imports: Vec<String>,
    /// Whether any field is a `date`, filled in by resolution.
    pub requires_date_only: bool,
    /// Extra import lines passed through to the emitter verbatim.
    pub custom_import_lines: Vec<String>,
}

impl SchemaDescription {
    /// Check the structure of a parsed description and normalize its fields.
    ///
    /// # Errors
    ///
    /// Returns a [`GeneratorError`] if `name` or `fields` is missing,
    /// `version` is not a non-negative integer, `customImportLines` is
    /// malformed, or any field fails [`normalize_field`].
    pub fn from_json(value: Value, origin: &str) -> Result<Self, GeneratorError> {
        let Value::Object(mut obj) = value else {
            return Err(GeneratorError::NotAnObject {
                origin: origin.to_string(),
            });
        };

        let name = match obj.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => {
                return Err(GeneratorError::MissingName {
                    origin: origin.to_string(),
                })
            }
        };

        let raw_fields = match obj.remove("fields") {
            Some(Value::Object(fields)) => fields,
            _ => return Err(GeneratorError::MissingFields { schema: name }),
        };

        let version = obj
            .get("version")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| GeneratorError::InvalidVersion {
                schema: name.clone(),
            })?;

        let custom_import_lines = match obj.get("customImportLines") {
            None => Vec::new(),
            Some(Value::Array(lines)) => lines
                .iter()
                .map(|line| line.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| GeneratorError::InvalidCustomImports {
                    schema: name.clone(),
                })?,
            Some(_) => {
                return Err(GeneratorError::InvalidCustomImports { schema: name });
            }
        };

        let mut fields = Vec::with_capacity(raw_fields.len());
        for (field_name, raw) in raw_fields {
            let spec = normalize_field(&name, &field_name, RawField::from(raw))?;
            fields.push((field_name, spec));
        }

        Ok(Self {
            name,
            version,
            origin: origin.to_string(),
            fields,
            imports: Vec::new(),
            requires_date_only: false,
            custom_import_lines,
        })
    }

    /// Document-type tag stored in every document of this schema.
    pub fn doctype(&self) -> String {
        self.name.to_lowercase()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, spec)| spec)
    }
}
