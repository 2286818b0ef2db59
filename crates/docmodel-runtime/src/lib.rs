//! # docmodel-runtime — Document Schemas & Validation
//!
//! The layer generated document models run on. A [`Schema`] describes a
//! document's fields; a [`Document`] owns a body of values together with an
//! `Arc<Schema>`; the validation engine checks one against the other.
//!
//! ## Modules
//!
//! - **Values** (`value.rs`): the [`Value`] enum, a JSON superset with
//!   date-only, datetime and buffer variants.
//!
//! - **Schemas** (`schema.rs`, `field.rs`): immutable runtime schemas and
//!   field descriptors, with named hooks for validation, formatting and
//!   calculated fields.
//!
//! - **Validation** (`validate.rs`, `result.rs`): the recursive engine.
//!   It mutates the body it checks (defaults, date coercion) and returns a
//!   [`ValidationResult`] with path-qualified errors.
//!
//! - **Schema sets** (`set.rs`, `hooks.rs`): builds runtime schemas from the
//!   generator's resolved graph, binding hook names through [`Hooks`].
//!
//! - **Lifecycle** (`lifecycle.rs`, `document.rs`): version upgrade and
//!   doctype check on construction, field access, JSON persistence.
//!
//! - **Store** (`store.rs`): the persistence seam, with an in-memory store.
//!
//! ## Design
//!
//! Schemas are never mutated after construction, so one `Arc<Schema>` can be
//! shared by documents validated on different threads. Only the document
//! under validation is mutated.

pub mod document;
pub mod error;
pub mod field;
pub mod hooks;
pub mod lifecycle;
pub mod result;
pub mod schema;
pub mod set;
pub mod store;
pub mod validate;
pub mod value;

pub use document::Document;
pub use error::{DocumentError, SchemaBuildError, StoreError, ValidationError};
pub use field::{CalculateFn, FieldDescriptor, FormatFn, Hook, ValidateFn};
pub use hooks::Hooks;
pub use lifecycle::{DocumentState, DOCTYPE_KEY, VERSION_KEY};
pub use result::{FieldError, ValidationResult};
pub use schema::{Schema, SchemaBuilder, Upgrade, UpgradeFn};
pub use set::{SchemaSet, Upgraders};
pub use store::{DocumentStore, MemoryStore};
pub use validate::{validate, validate_field, DEFAULT_FAIL_MSG};
pub use value::{fields_from_json, fields_to_json, Fields, Value};
