//! # Documents
//!
//! A [`Document`] is a body of field values owned together with a shared
//! reference to its [`Schema`]. Every constructor binds the body (see
//! [`crate::lifecycle`]) and then validates it, so a document always
//! carries its doctype and version tags and the outcome of its most recent
//! validation.
//!
//! Invalid documents are still constructed: shape problems are reported
//! through [`Document::validation`], not as errors.

use std::sync::Arc;

use crate::error::{DocumentError, ValidationError};
use crate::lifecycle::{DocumentState, DOCTYPE_KEY, VERSION_KEY};
use crate::result::ValidationResult;
use crate::schema::Schema;
use crate::store::DocumentStore;
use crate::value::{fields_from_json, Fields, Value};

/// A document bound to a schema.
#[derive(Debug, Clone)]
pub struct Document {
    schema: Arc<Schema>,
    body: Fields,
    state: DocumentState,
    validation: ValidationResult,
}

impl Document {
    /// An empty document with defaults applied.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Validation`] if a validator raises.
    pub fn new(schema: Arc<Schema>) -> Result<Self, DocumentError> {
        let mut body = Fields::new();
        body.insert(VERSION_KEY.to_string(), Value::from(schema.version()));
        Self::load(schema, body)
    }

    /// Bind a persisted body, upgrading it if it is older than the schema,
    /// then validate it.
    ///
    /// # Errors
    ///
    /// Returns the lifecycle errors of [`DocumentState::bind`] and
    /// [`DocumentError::Validation`] if a validator raises.
    pub fn load(schema: Arc<Schema>, body: Fields) -> Result<Self, DocumentError> {
        let (mut body, state) = DocumentState::Unbound.bind(&schema, body)?;
        let validation = schema.validate(&mut body)?;
        Ok(Self {
            schema,
            body,
            state,
            validation,
        })
    }

    /// Like [`Document::load`] for a JSON payload.
    ///
    /// # Errors
    ///
    /// [`DocumentError::NotAnObject`] if `payload` is not an object, and
    /// the errors of [`Document::load`].
    pub fn from_json(
        schema: Arc<Schema>,
        payload: serde_json::Value,
    ) -> Result<Self, DocumentError> {
        match payload {
            serde_json::Value::Object(map) => Self::load(schema, fields_from_json(map)),
            _ => Err(DocumentError::NotAnObject),
        }
    }

    /// Fetch and load the document stored under `id`. `Ok(None)` when the
    /// store has no such document.
    ///
    /// # Errors
    ///
    /// Store failures are propagated as [`DocumentError::Store`].
    pub fn fetch(
        store: &dyn DocumentStore,
        schema: Arc<Schema>,
        id: &str,
    ) -> Result<Option<Self>, DocumentError> {
        match store.get(id)? {
            Some(payload) => {
                tracing::debug!(schema = %schema.name(), id, "fetched document");
                Self::from_json(schema, payload).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Persist the document under `id`.
    ///
    /// # Errors
    ///
    /// Store failures are propagated as [`DocumentError::Store`].
    pub fn save(&self, store: &dyn DocumentStore, id: &str) -> Result<(), DocumentError> {
        store.put(id, self.to_json())?;
        Ok(())
    }

    /// The governing schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Lifecycle state.
    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// The raw body, control tags included.
    pub fn body(&self) -> &Fields {
        &self.body
    }

    /// Outcome of the most recent validation.
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Whether the most recent validation passed.
    pub fn is_valid(&self) -> bool {
        self.validation.result
    }

    /// Value of `name`. Calculated fields are computed from the body.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.schema.field(name) {
            Some(field) if !field.is_persisted() => field
                .calculator
                .as_ref()
                .map(|hook| (hook.func())(&self.body)),
            _ => self.body.get(name).cloned(),
        }
    }

    /// Assign `name`, applying the field's formatter. `None` removes it.
    ///
    /// # Errors
    ///
    /// [`DocumentError::UnknownField`] for undeclared names and
    /// [`DocumentError::ReadOnlyField`] for calculated fields.
    pub fn set(&mut self, name: &str, value: Option<Value>) -> Result<(), DocumentError> {
        let field = self.schema.field(name).ok_or_else(|| DocumentError::UnknownField {
            schema: self.schema.name().to_string(),
            field: name.to_string(),
        })?;
        if !field.is_persisted() {
            return Err(DocumentError::ReadOnlyField {
                field: name.to_string(),
            });
        }
        match value {
            None => {
                self.body.remove(name);
            }
            Some(value) => {
                let value = match &field.formatter {
                    Some(hook) => (hook.func())(value),
                    None => value,
                };
                self.body.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Re-validate the body, applying defaults and coercions.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a validator raises.
    pub fn validate(&mut self) -> Result<&ValidationResult, ValidationError> {
        self.validation = self.schema.validate(&mut self.body)?;
        Ok(&self.validation)
    }

    /// Persisted JSON form: every body entry except calculated fields.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .body
            .iter()
            .filter(|(key, _)| self.schema.field(key).map_or(true, |f| f.is_persisted()))
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    /// The document type tag.
    pub fn doctype(&self) -> &str {
        self.body
            .get(DOCTYPE_KEY)
            .and_then(Value::as_str)
            .unwrap_or_else(|| self.schema.doctype())
    }
}
