//! # Generator Errors
//!
//! Every schema configuration error is fatal for the generation run: a
//! malformed description must never produce a partially generated model set.
//! Each variant names the offending schema (or source file) and, where one
//! is involved, the field.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while loading, checking, resolving, or emitting schemas.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The description has no `name`.
    #[error("{origin}: no 'name' field")]
    MissingName {
        /// Source file or label the description came from.
        origin: String,
    },

    /// The description root is not a JSON object.
    #[error("{origin}: schema description must be a JSON object")]
    NotAnObject {
        /// Source file or label the description came from.
        origin: String,
    },

    /// The description has no `fields` object.
    #[error("{schema}: no 'fields' field")]
    MissingFields {
        /// Schema name.
        schema: String,
    },

    /// `version` is absent or not a non-negative integer.
    #[error("{schema}: 'version' field must exist and must be a non-negative integer")]
    InvalidVersion {
        /// Schema name.
        schema: String,
    },

    /// Two descriptions share a name.
    #[error("'{schema}' already exists; check for duplicates in the source files")]
    DuplicateSchema {
        /// Schema name.
        schema: String,
    },

    /// Field name is reserved or starts with an underscore.
    #[error("{schema}.{field}: {reason}")]
    InvalidFieldName {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// Why the name is rejected.
        reason: &'static str,
    },

    /// Array-wrapped field does not have exactly one element.
    #[error("{schema}.{field}: is an array but should have exactly one element (found {len})")]
    ArrayArity {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// Number of elements found.
        len: usize,
    },

    /// Shorthand string is not a known type.
    #[error("{schema}.{field}: unknown field type '{shorthand}'")]
    UnknownShorthand {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// The rejected shorthand.
        shorthand: String,
    },

    /// Field value is neither a shorthand, a descriptor object, nor a
    /// one-element list of either.
    #[error("{schema}.{field}: is not a valid object, array or string")]
    InvalidFieldShape {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
    },

    /// Descriptor sub-key has the wrong JSON type.
    #[error("{schema}.{field}.{key}: has to be {expected}")]
    InvalidSubkey {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// Descriptor key.
        key: &'static str,
        /// Accepted JSON types.
        expected: &'static str,
    },

    /// Mandatory descriptor sub-key is absent.
    #[error("{schema}.{field}.{key}: is missing")]
    MissingSubkey {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// Descriptor key.
        key: &'static str,
    },

    /// `required` is neither a boolean nor `"true"`/`"false"`.
    #[error("{schema}.{field}.required: invalid value {value}")]
    InvalidRequired {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// The rejected value, rendered as JSON.
        value: String,
    },

    /// Descriptor `type` names no known field type.
    #[error("{schema}.{field}.type: unknown field type '{type_name}'")]
    UnknownFieldType {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// The rejected type name.
        type_name: String,
    },

    /// `customImportLines` is present but not an array of strings.
    #[error("{schema}: customImportLines must be an array of strings")]
    InvalidCustomImports {
        /// Schema name.
        schema: String,
    },

    /// A `subschema` field has no `schema` property.
    #[error("{schema}: missing 'schema' field for field '{field}'")]
    MissingSubschemaName {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
    },

    /// A `subschema` field names a schema that is not registered.
    #[error("{schema}: field '{field}' refers to missing subschema named {target}")]
    MissingSubschema {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// The unresolved schema name.
        target: String,
    },

    /// The subschema reference graph contains a cycle.
    #[error("{schema} is in a circular dependency: cycle at {path}")]
    CircularDependency {
        /// Schema at which the walk started.
        schema: String,
        /// Reference path of the cycle, `Schema.field -> ... -> Schema`.
        path: String,
    },

    /// The source directory holds no description files.
    #[error("no input files found in {}", dir.display())]
    NoInputFiles {
        /// The scanned directory.
        dir: PathBuf,
    },

    /// An output artifact exists and overwriting was not requested.
    #[error("{} already exists; use --force to overwrite", path.display())]
    OutputExists {
        /// The existing artifact.
        path: PathBuf,
    },

    /// Reading or writing a file failed.
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A description file is not well-formed JSON, or a manifest could not
    /// be serialized.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl GeneratorError {
    /// The schema the error concerns, when known.
    pub fn schema(&self) -> Option<&str> {
        match self {
            Self::MissingFields { schema }
            | Self::InvalidVersion { schema }
            | Self::DuplicateSchema { schema }
            | Self::InvalidFieldName { schema, .. }
            | Self::ArrayArity { schema, .. }
            | Self::UnknownShorthand { schema, .. }
            | Self::InvalidFieldShape { schema, .. }
            | Self::InvalidSubkey { schema, .. }
            | Self::MissingSubkey { schema, .. }
            | Self::InvalidRequired { schema, .. }
            | Self::UnknownFieldType { schema, .. }
            | Self::InvalidCustomImports { schema }
            | Self::MissingSubschemaName { schema, .. }
            | Self::MissingSubschema { schema, .. }
            | Self::CircularDependency { schema, .. } => Some(schema),
            _ => None,
        }
    }
}
