//! # docmodel-schema — Schema Loading, Resolution & Emission
//!
//! The generator side of the document-model toolchain. A generation run is
//! a one-way pipeline:
//!
//! ```text
//! *.json ──load──▶ SchemaRegistry ──resolve──▶ ResolvedGraph ──emit──▶ artifacts
//! ```
//!
//! ## Load (`registry`, `description`, `descriptor`)
//!
//! Every description is checked structurally as it is loaded: `name`,
//! `fields` and `version` must be present, field names must not be
//! reserved, and each field is normalized into a canonical [`FieldSpec`].
//!
//! ## Resolve (`resolve`)
//!
//! Subschema references are linked by arena index, date-only users are
//! flagged, and the reference graph is checked for cycles. Any error here
//! aborts the run.
//!
//! ## Emit (`codegen`)
//!
//! An [`Emitter`] consumes the [`ResolvedGraph`]. Emission errors are
//! reported per schema.
//!
//! ## Crate Policy
//!
//! - Depends only on `docmodel-core` internally.
//! - Schema configuration errors are fatal; no partial model set is ever
//!   handed to an emitter.

pub mod codegen;
pub mod description;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod resolve;

pub use codegen::{emit_all, EmitOptions, EmitReport, Emitter, ManifestEmitter, INITIALIZER_FILE};
pub use description::SchemaDescription;
pub use descriptor::{
    normalize_field, Bound, FieldSpec, RawField, SchemaId, SubschemaRef, DESCRIPTOR_KEYS,
};
pub use error::GeneratorError;
pub use registry::SchemaRegistry;
pub use resolve::ResolvedGraph;
