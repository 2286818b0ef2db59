//! # docmodel-core — Foundational Types for docmodel
//!
//! The leaf of the workspace DAG. Defines the vocabulary shared by the
//! generator (`docmodel-schema`) and the runtime validation layer
//! (`docmodel-runtime`):
//!
//! 1. **`FieldType`**: the closed set of declared field types. One enum,
//!    exhaustive `match` everywhere, so adding a type forces every consumer
//!    (structural checker, validation engine, emitter) to handle it.
//!
//! 2. **`Shorthand`**: the short string forms a description file may use in
//!    place of a full field descriptor (`"string"`, `"optboolean"`, ...).
//!
//! 3. **`DateOnly`**: a calendar date without time or zone, the value type
//!    that `date` fields are coerced into.
//!
//! 4. **Reserved names**: field names a schema may never declare.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `docmodel-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod field_type;
pub mod temporal;

pub use error::CoreError;
pub use field_type::{check_field_name, FieldType, Shorthand, RESERVED_FIELD_NAMES};
pub use temporal::{format_datetime, parse_datetime, DateOnly};
