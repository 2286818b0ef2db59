//! # Error Types
//!
//! Errors raised by the foundational types. Schema configuration errors
//! live in `docmodel-schema`; runtime validation errors live in
//! `docmodel-runtime`. Both wrap or mirror these where a core parse fails.

use thiserror::Error;

/// Error produced by core parsing helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The input is not a calendar date.
    #[error("invalid date {input:?}: expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },

    /// The input is not a date-time in any accepted form.
    #[error("invalid datetime {input:?}: {reason}")]
    InvalidDateTime {
        /// The rejected input.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The name does not denote a declared field type.
    #[error("unknown field type {0:?}")]
    UnknownFieldType(String),

    /// The name is reserved or otherwise unusable as a field name.
    #[error("invalid field name '{name}': {reason}")]
    InvalidFieldName {
        /// The rejected field name.
        name: String,
        /// Why the name is rejected.
        reason: &'static str,
    },
}
