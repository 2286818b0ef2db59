//! # Runtime Field Descriptors
//!
//! The runtime counterpart of a generator `FieldSpec`: bounds are parsed to
//! numbers, hook names are bound to functions, and subschema references are
//! live [`Schema`] handles.

use std::fmt;
use std::sync::Arc;

use docmodel_core::FieldType;

use crate::schema::Schema;
use crate::value::{Fields, Value};

/// Custom validator. `Ok(false)` fails the field with the configured
/// message; `Err(message)` is a developer defect and aborts validation.
pub type ValidateFn = dyn Fn(&Value) -> Result<bool, String> + Send + Sync;

/// Value transform applied on assignment.
pub type FormatFn = dyn Fn(Value) -> Value + Send + Sync;

/// Computes a calculated field from the document body.
pub type CalculateFn = dyn Fn(&Fields) -> Value + Send + Sync;

/// A named, shareable function.
pub struct Hook<F: ?Sized> {
    name: String,
    func: Arc<F>,
}

impl<F: ?Sized> Hook<F> {
    /// Wrap a function under a name.
    pub fn new(name: impl Into<String>, func: Arc<F>) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function.
    pub fn func(&self) -> &F {
        &self.func
    }
}

impl<F: ?Sized> Clone for Hook<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Hook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hook").field(&self.name).finish()
    }
}

/// One field of a runtime schema.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Declared type.
    pub field_type: FieldType,
    /// Whether the value is a list of `field_type`.
    pub is_array: bool,
    /// Whether a value must be present.
    pub required: bool,
    /// Value materialized when the field is absent.
    pub default: Option<Value>,
    /// Lower bound: length for strings, value for numbers.
    pub min: Option<f64>,
    /// Upper bound: length for strings, value for numbers.
    pub max: Option<f64>,
    /// Custom validator.
    pub validate: Option<Hook<ValidateFn>>,
    /// Failure message template for `validate`.
    pub validate_fail_msg: Option<String>,
    /// Transform applied by `Document::set`.
    pub formatter: Option<Hook<FormatFn>>,
    /// Calculator for `calculated` fields.
    pub calculator: Option<Hook<CalculateFn>>,
    /// Schema governing nested documents of `subschema` fields.
    pub schema: Option<Arc<Schema>>,
}

impl FieldDescriptor {
    /// A required, scalar field with no constraints.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            is_array: false,
            required: true,
            default: None,
            min: None,
            max: None,
            validate: None,
            validate_fail_msg: None,
            formatter: None,
            calculator: None,
            schema: None,
        }
    }

    /// A `subschema` field governed by `schema`.
    pub fn subschema(name: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self {
            schema: Some(schema),
            ..Self::new(name, FieldType::Subschema)
        }
    }

    /// A `calculated` field.
    pub fn calculated<F>(name: impl Into<String>, calculator: &str, func: F) -> Self
    where
        F: Fn(&Fields) -> Value + Send + Sync + 'static,
    {
        Self {
            calculator: Some(Hook::new(calculator, Arc::new(func) as Arc<CalculateFn>)),
            ..Self::new(name, FieldType::Calculated)
        }
    }

    /// Mark the field as not required.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Mark the field as a list.
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the lower bound.
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the upper bound.
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Attach a custom validator.
    pub fn with_validator<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.validate = Some(Hook::new(name, Arc::new(func) as Arc<ValidateFn>));
        self
    }

    /// Set the validator failure template.
    pub fn with_fail_msg(mut self, template: impl Into<String>) -> Self {
        self.validate_fail_msg = Some(template.into());
        self
    }

    /// Attach a formatter.
    pub fn with_formatter<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.formatter = Some(Hook::new(name, Arc::new(func) as Arc<FormatFn>));
        self
    }

    /// Whether the field is stored in documents.
    pub fn is_persisted(&self) -> bool {
        self.field_type.is_persisted()
    }
}
