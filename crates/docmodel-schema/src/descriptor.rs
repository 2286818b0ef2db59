//! # Field Descriptors
//!
//! A description file may state a field in three shapes:
//!
//! ```json
//! "name":    "string",                              // shorthand
//! "age":     { "type": "number", "min": 0 },        // descriptor object
//! "tags":    ["string"],                            // one-element list = array of
//! ```
//!
//! [`RawField`] is the tagged form of that boundary value. [`normalize_field`]
//! turns it into one canonical [`FieldSpec`] before anything else looks at
//! it; the "array of" fact survives only as [`FieldSpec::is_array`].
//!
//! Shorthands expand to a freshly built `FieldSpec` each time, so two
//! fields declared with the same shorthand never share state.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use docmodel_core::{check_field_name, CoreError, FieldType, Shorthand};

use crate::error::GeneratorError;

/// Keys a descriptor object may carry.
pub const DESCRIPTOR_KEYS: &[&str] = &[
    "type",
    "default",
    "values",
    "validate",
    "validateFailMsg",
    "formatter",
    "schema",
    "required",
    "min",
    "max",
    "calculator",
    "calculatedType",
];

/// Index of a schema inside a registry or resolved graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    /// Position of the schema in load order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Reference from a `subschema` field to the schema governing its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubschemaRef {
    /// As written in the description; not yet looked up.
    Named(String),
    /// Looked up in the registry during resolution.
    Linked {
        /// Name of the referenced schema.
        name: String,
        /// Arena index of the referenced schema.
        id: SchemaId,
    },
}

impl SubschemaRef {
    /// Name of the referenced schema.
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) | Self::Linked { name, .. } => name,
        }
    }

    /// Arena index, once linked.
    pub fn id(&self) -> Option<SchemaId> {
        match self {
            Self::Named(_) => None,
            Self::Linked { id, .. } => Some(*id),
        }
    }
}

impl Serialize for SubschemaRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A `min` / `max` bound as declared: a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Bound {
    /// Numeric bound.
    Number(f64),
    /// Textual bound, interpreted by the runtime per field type.
    Text(String),
}

impl Bound {
    /// The bound as a number, parsing textual bounds.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// The raw shape of a field value in a description file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawField {
    /// A shorthand type name.
    Shorthand(String),
    /// A descriptor object.
    Descriptor(Map<String, Value>),
    /// A list; valid only with exactly one element.
    List(Vec<Value>),
    /// Anything else (number, boolean, null).
    Other(Value),
}

impl From<Value> for RawField {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Shorthand(s),
            Value::Object(map) => Self::Descriptor(map),
            Value::Array(items) => Self::List(items),
            other => Self::Other(other),
        }
    }
}

/// Canonical, normalized description of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the value is a list of `field_type`.
    pub is_array: bool,
    /// Whether a value must be present.
    pub required: bool,
    /// Value materialized when the field is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Fenced type hint for emitted typings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    /// Name of a custom validation hook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate: Option<String>,
    /// Failure message template for the validation hook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_fail_msg: Option<String>,
    /// Name of a formatting hook applied on assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    /// Referenced schema for `subschema` fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SubschemaRef>,
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Bound>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,
    /// Name of the calculator hook for `calculated` fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculator: Option<String>,
    /// Type produced by the calculator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_type: Option<String>,
}

impl FieldSpec {
    /// A required, scalar field of the given type with no constraints.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            is_array: false,
            required: true,
            default: None,
            values: None,
            validate: None,
            validate_fail_msg: None,
            formatter: None,
            schema: None,
            min: None,
            max: None,
            calculator: None,
            calculated_type: None,
        }
    }

    /// A fresh canonical descriptor for a shorthand.
    pub fn from_shorthand(shorthand: Shorthand) -> Self {
        Self {
            required: shorthand.required(),
            ..Self::new(shorthand.field_type())
        }
    }

    /// The linked subschema, once resolved.
    pub fn linked_subschema(&self) -> Option<SchemaId> {
        if !self.field_type.is_subschema() {
            return None;
        }
        self.schema.as_ref().and_then(SubschemaRef::id)
    }
}

/// Normalize one field of schema `schema`.
///
/// # Errors
///
/// Returns the [`GeneratorError`] describing the first structural problem:
/// reserved name, bad list arity, unknown shorthand, wrong shape, or a
/// malformed descriptor key.
pub fn normalize_field(
    schema: &str,
    field: &str,
    raw: RawField,
) -> Result<FieldSpec, GeneratorError> {
    let ctx = FieldCtx { schema, field };

    if let Err(CoreError::InvalidFieldName { reason, .. }) = check_field_name(field) {
        return Err(GeneratorError::InvalidFieldName {
            schema: schema.to_string(),
            field: field.to_string(),
            reason,
        });
    }

    let (raw, is_array) = match raw {
        RawField::List(mut items) => {
            if items.len() != 1 {
                return Err(GeneratorError::ArrayArity {
                    schema: schema.to_string(),
                    field: field.to_string(),
                    len: items.len(),
                });
            }
            (RawField::from(items.remove(0)), true)
        }
        other => (other, false),
    };

    let mut spec = match raw {
        RawField::Shorthand(name) => Shorthand::parse(&name)
            .map(FieldSpec::from_shorthand)
            .ok_or_else(|| GeneratorError::UnknownShorthand {
                schema: schema.to_string(),
                field: field.to_string(),
                shorthand: name,
            })?,
        RawField::Descriptor(map) => normalize_descriptor(&ctx, &map)?,
        RawField::List(_) | RawField::Other(_) => return Err(ctx.invalid_shape()),
    };
    spec.is_array = is_array;
    Ok(spec)
}

struct FieldCtx<'a> {
    schema: &'a str,
    field: &'a str,
}

impl FieldCtx<'_> {
    fn invalid_shape(&self) -> GeneratorError {
        GeneratorError::InvalidFieldShape {
            schema: self.schema.to_string(),
            field: self.field.to_string(),
        }
    }

    fn invalid_subkey(&self, key: &'static str, expected: &'static str) -> GeneratorError {
        GeneratorError::InvalidSubkey {
            schema: self.schema.to_string(),
            field: self.field.to_string(),
            key,
            expected,
        }
    }

    fn missing_subkey(&self, key: &'static str) -> GeneratorError {
        GeneratorError::MissingSubkey {
            schema: self.schema.to_string(),
            field: self.field.to_string(),
            key,
        }
    }

    fn optional_string(
        &self,
        map: &Map<String, Value>,
        key: &'static str,
    ) -> Result<Option<String>, GeneratorError> {
        match map.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid_subkey(key, "a string")),
        }
    }

    fn mandatory_string(
        &self,
        map: &Map<String, Value>,
        key: &'static str,
    ) -> Result<String, GeneratorError> {
        self.optional_string(map, key)?
            .ok_or_else(|| self.missing_subkey(key))
    }

    fn optional_bound(
        &self,
        map: &Map<String, Value>,
        key: &'static str,
    ) -> Result<Option<Bound>, GeneratorError> {
        match map.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(Bound::Text(s.clone()))),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(|n| Some(Bound::Number(n)))
                .ok_or_else(|| self.invalid_subkey(key, "one of number,string")),
            Some(_) => Err(self.invalid_subkey(key, "one of number,string")),
        }
    }

    fn required_flag(&self, map: &Map<String, Value>) -> Result<bool, GeneratorError> {
        let invalid = |value: &Value| GeneratorError::InvalidRequired {
            schema: self.schema.to_string(),
            field: self.field.to_string(),
            value: value.to_string(),
        };
        match map.get("required") {
            None => Ok(true),
            Some(Value::Bool(b)) => Ok(*b),
            Some(value) => match value.as_str().map(str::to_ascii_lowercase).as_deref() {
                Some("true") => Ok(true),
                Some("false") => Ok(false),
                _ => Err(invalid(value)),
            },
        }
    }
}

fn normalize_descriptor(
    ctx: &FieldCtx<'_>,
    map: &Map<String, Value>,
) -> Result<FieldSpec, GeneratorError> {
    let type_name = ctx.mandatory_string(map, "type")?;
    let field_type: FieldType = type_name.parse().map_err(|_| GeneratorError::UnknownFieldType {
        schema: ctx.schema.to_string(),
        field: ctx.field.to_string(),
        type_name: type_name.clone(),
    })?;

    let values = ctx.optional_string(map, "values")?;
    let validate = ctx.optional_string(map, "validate")?;
    let formatter = ctx.optional_string(map, "formatter")?;
    let validate_fail_msg = ctx.optional_string(map, "validateFailMsg")?;
    let min = ctx.optional_bound(map, "min")?;
    let max = ctx.optional_bound(map, "max")?;

    let (calculator, calculated_type) = if field_type == FieldType::Calculated {
        (
            Some(ctx.mandatory_string(map, "calculator")?),
            Some(ctx.mandatory_string(map, "calculatedType")?),
        )
    } else {
        (
            ctx.optional_string(map, "calculator")?,
            ctx.optional_string(map, "calculatedType")?,
        )
    };

    let schema = if field_type.is_subschema() {
        ctx.optional_string(map, "schema")?.map(SubschemaRef::Named)
    } else {
        None
    };

    let required = ctx.required_flag(map)?;

    for key in map.keys() {
        if !DESCRIPTOR_KEYS.contains(&key.as_str()) {
            tracing::warn!(
                schema = ctx.schema,
                field = ctx.field,
                key = %key,
                "ignoring unrecognized descriptor key"
            );
        }
    }

    Ok(FieldSpec {
        field_type,
        is_array: false,
        required,
        default: map.get("default").cloned(),
        values,
        validate,
        validate_fail_msg,
        formatter,
        schema,
        min,
        max,
        calculator,
        calculated_type,
    })
}
