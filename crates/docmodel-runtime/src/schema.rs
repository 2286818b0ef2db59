//! # Runtime Schemas
//!
//! A [`Schema`] is immutable once built and is shared between documents
//! through `Arc`. Schemas come from two places: [`SchemaSet::build`]
//! for generator output, and [`Schema::builder`] for schemas declared in
//! code.
//!
//! [`SchemaSet::build`]: crate::SchemaSet::build

use std::sync::Arc;

use crate::error::ValidationError;
use crate::field::{FieldDescriptor, Hook};
use crate::result::ValidationResult;
use crate::validate::validate;
use crate::value::Fields;

/// Outcome of an upgrader run.
#[derive(Debug, Clone, PartialEq)]
pub struct Upgrade {
    /// Whether `obj` replaces the stored document.
    pub changed: bool,
    /// The upgraded document.
    pub obj: Fields,
}

impl Upgrade {
    /// The document needs no change.
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            obj: Fields::new(),
        }
    }

    /// Replace the document with `obj`.
    pub fn changed(obj: Fields) -> Self {
        Self { changed: true, obj }
    }
}

/// Migrates an older document body to the current schema version.
pub type UpgradeFn = dyn Fn(&Fields) -> Upgrade + Send + Sync;

/// A document schema.
#[derive(Debug)]
pub struct Schema {
    name: String,
    doctype: String,
    version: u32,
    fields: Vec<FieldDescriptor>,
    upgrader: Option<Hook<UpgradeFn>>,
}

impl Schema {
    /// Start declaring a schema.
    pub fn builder(name: impl Into<String>, version: u32) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            version,
            fields: Vec::new(),
            upgrader: None,
        }
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag stored in every document of this schema.
    pub fn doctype(&self) -> &str {
        &self.doctype
    }

    /// Current version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Run the upgrader, if any. Returns the replacement body when the
    /// upgrader reports a change.
    pub fn upgrade(&self, doc: &Fields) -> Option<Fields> {
        let hook = self.upgrader.as_ref()?;
        let upgrade = (hook.func())(doc);
        upgrade.changed.then_some(upgrade.obj)
    }

    /// Validate `doc`, applying defaults and coercions to it in place.
    ///
    /// # Errors
    ///
    /// See [`crate::validate::validate`].
    pub fn validate(&self, doc: &mut Fields) -> Result<ValidationResult, ValidationError> {
        validate(self, doc)
    }
}

/// Builder returned by [`Schema::builder`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    version: u32,
    fields: Vec<FieldDescriptor>,
    upgrader: Option<Hook<UpgradeFn>>,
}

impl SchemaBuilder {
    /// Append a field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the upgrader.
    pub fn upgrader<F>(self, name: &str, func: F) -> Self
    where
        F: Fn(&Fields) -> Upgrade + Send + Sync + 'static,
    {
        self.upgrader_hook(Hook::new(name, Arc::new(func) as Arc<UpgradeFn>))
    }

    /// Set an already wrapped upgrader.
    pub fn upgrader_hook(mut self, hook: Hook<UpgradeFn>) -> Self {
        self.upgrader = Some(hook);
        self
    }

    /// Finish the schema. The doctype is the name lowercased.
    pub fn build(self) -> Schema {
        Schema {
            doctype: self.name.to_lowercase(),
            name: self.name,
            version: self.version,
            fields: self.fields,
            upgrader: self.upgrader,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use docmodel_core::FieldType;

    #[test]
    fn doctype_is_lowercased_name() {
        let schema = Schema::builder("PhoneNumber", 3).build();
        assert_eq!(schema.doctype(), "phonenumber");
        assert_eq!(schema.version(), 3);
    }

    #[test]
    fn field_lookup_keeps_order() {
        let schema = Schema::builder("P", 1)
            .field(FieldDescriptor::new("b", FieldType::String))
            .field(FieldDescriptor::new("a", FieldType::Number))
            .build();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(schema.field("a").is_some());
        assert!(schema.field("c").is_none());
    }

    #[test]
    fn upgrade_only_when_changed() {
        let schema = Schema::builder("P", 2)
            .upgrader("rename", |doc| match doc.get("fullname") {
                Some(v) => {
                    let mut obj = doc.clone();
                    obj.remove("fullname");
                    obj.insert("name".into(), v.clone());
                    Upgrade::changed(obj)
                }
                None => Upgrade::unchanged(),
            })
            .build();

        let mut old = Fields::new();
        old.insert("fullname".into(), Value::from("Bob"));
        let upgraded = schema.upgrade(&old).unwrap();
        assert_eq!(upgraded["name"], Value::from("Bob"));

        assert!(schema.upgrade(&Fields::new()).is_none());
        assert!(Schema::builder("Q", 1).build().upgrade(&old).is_none());
    }
}
