//! # Validation Engine
//!
//! Validates a document body against a [`Schema`], field by field in
//! declaration order, descending depth-first into nested documents.
//!
//! `validate` takes the body mutably and edits it in place before checking:
//!
//! - an absent (or `null`) field with a `default` gets the default;
//! - a `date` field holding a string is parsed to a [`DateOnly`], and one
//!   holding a datetime is truncated to its UTC date;
//! - a `datetime`/`timestamp` field holding a string is parsed.
//!
//! Strings that fail to parse are left alone and then fail the type check.
//!
//! Scalar checks short-circuit in this order: required, type, bounds,
//! custom validator. Shape problems become entries in the returned
//! [`ValidationResult`]; a validator that raises, or a field type that
//! cannot be validated, is returned as [`ValidationError`].

use docmodel_core::{parse_datetime, DateOnly, FieldType};

use crate::error::ValidationError;
use crate::field::FieldDescriptor;
use crate::result::ValidationResult;
use crate::schema::Schema;
use crate::value::{Fields, Value};

/// Message used when a validator fails and no template is configured.
pub const DEFAULT_FAIL_MSG: &str = "Failed validation function";

/// Validate every persisted field of `schema` in `doc`.
///
/// Calculated fields are skipped.
///
/// # Errors
///
/// Returns [`ValidationError`] for developer defects; document problems
/// are reported in the result.
pub fn validate(schema: &Schema, doc: &mut Fields) -> Result<ValidationResult, ValidationError> {
    let mut out = ValidationResult::new();
    for field in schema.fields() {
        if !field.is_persisted() {
            continue;
        }
        let result = validate_field(field, doc)?;
        out.merge("", result);
    }
    tracing::trace!(schema = %schema.name(), valid = out.result, "validated document");
    Ok(out)
}

/// Validate one field of `doc`, applying its default and coercions first.
///
/// # Errors
///
/// [`ValidationError::UnhandledType`] for calculated fields, and
/// [`ValidationError::ValidatorRaised`] when a custom validator raises.
pub fn validate_field(
    field: &FieldDescriptor,
    doc: &mut Fields,
) -> Result<ValidationResult, ValidationError> {
    if field.field_type == FieldType::Calculated {
        return Err(ValidationError::UnhandledType {
            field: field.name.clone(),
            type_name: field.field_type.to_string(),
        });
    }

    if is_absent(doc.get(&field.name)) {
        if let Some(default) = &field.default {
            doc.insert(field.name.clone(), default.clone());
        }
    }

    let path = field.name.as_str();
    let mut out = ValidationResult::new();
    match (field.field_type, field.is_array) {
        (FieldType::Subschema, false) => nested_document(field, path, doc.get_mut(path), &mut out)?,
        (FieldType::Subschema, true) => nested_array(field, path, doc.get_mut(path), &mut out)?,
        (_, true) => {
            if let Some(Value::Array(items)) = doc.get_mut(path) {
                items.iter_mut().for_each(|item| coerce(field.field_type, item));
            }
            scalar_array(field, path, doc.get(path), &mut out)?;
        }
        (_, false) => {
            if let Some(value) = doc.get_mut(path) {
                coerce(field.field_type, value);
            }
            scalar(field, path, doc.get(path), &mut out)?;
        }
    }
    Ok(out)
}

fn is_absent(value: Option<&Value>) -> bool {
    value.map_or(true, Value::is_null)
}

fn coerce(field_type: FieldType, value: &mut Value) {
    let coerced = match (field_type, &*value) {
        (FieldType::Date, Value::String(s)) => DateOnly::parse(s).ok().map(Value::Date),
        (FieldType::Date, Value::DateTime(dt)) => Some(Value::Date(DateOnly::from_datetime(dt))),
        (FieldType::DateTime | FieldType::Timestamp, Value::String(s)) => {
            parse_datetime(s).ok().map(Value::DateTime)
        }
        (FieldType::Buffer, Value::Object(_)) => value.decode_buffer().map(Value::Buffer),
        _ => None,
    };
    if let Some(coerced) = coerced {
        *value = coerced;
    }
}

fn missing(field: &FieldDescriptor, path: &str, out: &mut ValidationResult) {
    if field.required {
        out.fail(path, format!("missing field {path}"));
    } else {
        out.pass(path);
    }
}

fn nested_document(
    field: &FieldDescriptor,
    path: &str,
    value: Option<&mut Value>,
    out: &mut ValidationResult,
) -> Result<(), ValidationError> {
    let schema = field.schema.as_ref().ok_or_else(|| ValidationError::MissingSubschema {
        field: path.to_string(),
    })?;
    match value {
        None | Some(Value::Null) => missing(field, path, out),
        Some(Value::Object(body)) => {
            let nested = validate(schema, body)?;
            let ok = nested.result;
            out.merge(&format!("{path}."), nested);
            out.mark(path, ok);
        }
        Some(Value::Array(_)) => out.fail(path, format!("{path} must not be an array")),
        Some(_) => out.fail(path, format!("{path} must be an object")),
    }
    Ok(())
}

fn nested_array(
    field: &FieldDescriptor,
    path: &str,
    value: Option<&mut Value>,
    out: &mut ValidationResult,
) -> Result<(), ValidationError> {
    let schema = field.schema.as_ref().ok_or_else(|| ValidationError::MissingSubschema {
        field: path.to_string(),
    })?;
    let items = match value {
        None | Some(Value::Null) => {
            missing(field, path, out);
            return Ok(());
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            out.fail(path, format!("{path} must be an array"));
            return Ok(());
        }
    };

    let mut all_ok = true;
    for (i, item) in items.iter_mut().enumerate() {
        let item_path = format!("{path}[{i}]");
        match item {
            Value::Object(body) => {
                let nested = validate(schema, body)?;
                all_ok &= nested.result;
                let ok = nested.result;
                out.merge(&format!("{item_path}."), nested);
                out.mark(item_path, ok);
            }
            _ => {
                all_ok = false;
                out.fail(item_path.clone(), format!("{item_path} must be an object"));
            }
        }
    }
    out.mark(path, all_ok);
    Ok(())
}

fn scalar_array(
    field: &FieldDescriptor,
    path: &str,
    value: Option<&Value>,
    out: &mut ValidationResult,
) -> Result<(), ValidationError> {
    let items = match value {
        None | Some(Value::Null) => {
            missing(field, path, out);
            return Ok(());
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            out.fail(path, format!("{path} must be an array"));
            return Ok(());
        }
    };

    let mut all_ok = true;
    for (i, item) in items.iter().enumerate() {
        let mut element = ValidationResult::new();
        scalar(field, &format!("{path}[{i}]"), Some(item), &mut element)?;
        all_ok &= element.result;
        out.merge("", element);
    }
    out.mark(path, all_ok);
    Ok(())
}

fn scalar(
    field: &FieldDescriptor,
    path: &str,
    value: Option<&Value>,
    out: &mut ValidationResult,
) -> Result<(), ValidationError> {
    let value = match value {
        None | Some(Value::Null) => {
            missing(field, path, out);
            return Ok(());
        }
        Some(Value::Array(_)) => {
            out.fail(path, format!("{path} must not be an array"));
            return Ok(());
        }
        Some(value) => value,
    };

    if !type_matches(field, path, value)? {
        out.fail(
            path,
            format!("{path} must be of type {}, got {}", field.field_type, value.type_name()),
        );
        return Ok(());
    }

    if let Some(error) = check_bounds(field, path, value) {
        out.fail(path, error);
        return Ok(());
    }

    if let Some(hook) = &field.validate {
        let ok = (hook.func())(value).map_err(|message| ValidationError::ValidatorRaised {
            field: path.to_string(),
            message,
        })?;
        if !ok {
            let template = field.validate_fail_msg.as_deref().unwrap_or(DEFAULT_FAIL_MSG);
            out.fail(path, render_fail_msg(template, value, field.field_type));
            return Ok(());
        }
    }

    out.pass(path);
    Ok(())
}

fn type_matches(
    field: &FieldDescriptor,
    path: &str,
    value: &Value,
) -> Result<bool, ValidationError> {
    Ok(match field.field_type {
        FieldType::String => matches!(value, Value::String(_)),
        FieldType::Boolean => matches!(value, Value::Bool(_)),
        FieldType::Number => matches!(value, Value::Number(_)),
        FieldType::Date => matches!(value, Value::Date(_)),
        FieldType::DateTime | FieldType::Timestamp => matches!(value, Value::DateTime(_)),
        FieldType::Buffer => matches!(value, Value::Buffer(_)),
        FieldType::Subschema | FieldType::Calculated => {
            return Err(ValidationError::UnhandledType {
                field: path.to_string(),
                type_name: field.field_type.to_string(),
            })
        }
    })
}

/// Strings are measured in UTF-16 code units; numbers by value. Other types
/// carry no bounds.
fn check_bounds(field: &FieldDescriptor, path: &str, value: &Value) -> Option<String> {
    if field.min.is_none() && field.max.is_none() {
        return None;
    }
    let (measure, subject) = match value {
        Value::String(s) => (s.encode_utf16().count() as f64, format!("{path} length")),
        Value::Number(n) => (*n, path.to_string()),
        _ => return None,
    };
    let too_small = field.min.is_some_and(|min| measure < min);
    let too_large = field.max.is_some_and(|max| measure > max);
    if !too_small && !too_large {
        return None;
    }
    Some(match (field.min, field.max) {
        (Some(min), Some(max)) => {
            format!("{subject} must be between {}-{}", bound(min), bound(max))
        }
        (Some(min), None) => format!("{subject} must be at least {}", bound(min)),
        (None, Some(max)) => format!("{subject} must be at most {}", bound(max)),
        (None, None) => return None,
    })
}

fn bound(n: f64) -> String {
    Value::Number(n).to_string()
}

/// Substitute `%v%`, `%t%`, `%s%` and `%S%` in one left-to-right pass.
fn render_fail_msg(template: &str, value: &Value, declared: FieldType) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let replacement = match tail.get(..3) {
            Some("%v%") => Some(value.to_string()),
            Some("%t%") => Some(value.type_name().to_string()),
            Some("%s%") => Some(declared.as_str().to_string()),
            Some("%S%") => Some(declared.constructor_name().to_string()),
            _ => None,
        };
        match replacement {
            Some(text) => {
                out.push_str(&text);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
