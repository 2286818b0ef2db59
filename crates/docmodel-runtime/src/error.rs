//! Runtime error types.
//!
//! Document shape problems are not errors: they are collected in a
//! [`ValidationResult`](crate::ValidationResult). The types here are the
//! failures a caller must handle: broken hooks, misconfigured schemas,
//! documents that belong to another schema, and store failures.

use thiserror::Error;

/// Developer or configuration defect found while validating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A custom validator raised instead of returning a verdict.
    #[error("validator for {field} raised: {message}")]
    ValidatorRaised {
        /// Field path being validated.
        field: String,
        /// Message raised by the validator.
        message: String,
    },

    /// The field's declared type cannot be validated directly.
    #[error("unhandled type {type_name} for field {field}")]
    UnhandledType {
        /// Field path being validated.
        field: String,
        /// Declared type.
        type_name: String,
    },

    /// A subschema field has no schema attached.
    #[error("field {field} is a subschema field without a schema")]
    MissingSubschema {
        /// Field path being validated.
        field: String,
    },
}

/// Failure turning resolved descriptions into runtime schemas.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaBuildError {
    /// A `validate`, `formatter` or `calculator` name is not registered.
    #[error("{schema}.{field}: no {kind} named '{name}' is registered")]
    UnknownHook {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// Hook kind (validator, formatter, calculator).
        kind: &'static str,
        /// The unregistered name.
        name: String,
    },

    /// A textual `min`/`max` is not numeric.
    #[error("{schema}.{field}.{key}: '{value}' is not a number")]
    InvalidBound {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// `min` or `max`.
        key: &'static str,
        /// The declared bound.
        value: String,
    },

    /// A subschema was not built before its dependent.
    #[error("{schema}.{field}: subschema '{target}' is not available")]
    MissingSubschema {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
        /// Referenced schema.
        target: String,
    },

    /// An upgrader was registered for a schema that does not exist.
    #[error("upgrader registered for unknown schema '{schema}'")]
    UnknownUpgraderTarget {
        /// Schema name the upgrader was registered under.
        schema: String,
    },
}

/// Failure reported by a [`DocumentStore`](crate::DocumentStore).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

/// Document lifecycle failure.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document's type tag names another schema.
    #[error("document type mismatch: expected '{expected}', found '{found}'")]
    WrongDocType {
        /// The schema's doctype.
        expected: String,
        /// The tag carried by the document.
        found: String,
    },

    /// The document was written by a newer schema version.
    #[error("document version {found} is newer than schema {schema} version {current}")]
    FutureVersion {
        /// Schema name.
        schema: String,
        /// Version carried by the document.
        found: u64,
        /// Current schema version.
        current: u32,
    },

    /// A control tag has the wrong JSON type.
    #[error("control field {key} is malformed")]
    MalformedControlField {
        /// The control key.
        key: &'static str,
    },

    /// A persisted payload is not a JSON object.
    #[error("persisted document is not a JSON object")]
    NotAnObject,

    /// The schema declares no such field.
    #[error("schema {schema} has no field {field}")]
    UnknownField {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
    },

    /// Calculated fields cannot be assigned.
    #[error("field {field} is calculated and cannot be set")]
    ReadOnlyField {
        /// Field name.
        field: String,
    },

    /// Validation hit a developer defect.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
