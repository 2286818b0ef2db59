//! Validation results.

use std::collections::BTreeMap;

use serde::Serialize;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Qualified path of the failing field (`address.city`, `tags[2]`).
    pub field_name: String,
    /// Human-readable message.
    pub error: String,
}

/// Outcome of validating a document or a single field.
///
/// `fields` maps every visited path to whether it and all of its
/// descendants passed. Nested results are folded in with
/// [`ValidationResult::merge`], which qualifies their paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Conjunction of every field's outcome.
    pub result: bool,
    /// Per-path outcome.
    pub fields: BTreeMap<String, bool>,
    /// Failures in the order they were found.
    pub errors: Vec<FieldError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// An empty, passing result.
    pub fn new() -> Self {
        Self {
            result: true,
            fields: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Whether nothing failed.
    pub fn is_valid(&self) -> bool {
        self.result
    }

    /// Outcome recorded for `path`, if visited.
    pub fn field(&self, path: &str) -> Option<bool> {
        self.fields.get(path).copied()
    }

    /// Messages recorded for exactly `path`.
    pub fn errors_for<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field_name == path)
            .map(|e| e.error.as_str())
    }

    /// Record `path` as passed unless it already failed.
    pub fn pass(&mut self, path: impl Into<String>) {
        self.fields.entry(path.into()).or_insert(true);
    }

    /// Record a failure with its message.
    pub fn fail(&mut self, path: impl Into<String>, error: impl Into<String>) {
        let path = path.into();
        self.result = false;
        self.fields.insert(path.clone(), false);
        self.errors.push(FieldError {
            field_name: path,
            error: error.into(),
        });
    }

    /// Record the aggregate outcome of a container path without a message.
    pub fn mark(&mut self, path: impl Into<String>, ok: bool) {
        if ok {
            self.pass(path);
        } else {
            self.result = false;
            self.fields.insert(path.into(), false);
        }
    }

    /// Fold `nested` in, prefixing each of its paths with `prefix`.
    pub fn merge(&mut self, prefix: &str, nested: ValidationResult) {
        if !nested.result {
            self.result = false;
        }
        for (path, ok) in nested.fields {
            let path = format!("{prefix}{path}");
            if ok {
                self.fields.entry(path).or_insert(true);
            } else {
                self.fields.insert(path, false);
            }
        }
        self.errors.extend(nested.errors.into_iter().map(|e| FieldError {
            field_name: format!("{prefix}{}", e.field_name),
            error: e.error,
        }));
    }
}
