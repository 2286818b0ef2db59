//! # Schema Sets
//!
//! Builds runtime [`Schema`]s from a generator [`ResolvedGraph`]. Schemas
//! are built in dependency order, so every subschema field can hold a live
//! `Arc<Schema>` of an already built schema; the graph is acyclic, so this
//! order always exists.
//!
//! Hook names are bound through a [`Hooks`] registry and upgraders are
//! attached by schema name. Textual `min`/`max` bounds are parsed here;
//! bounds only apply to `string` and `number` fields and are dropped for
//! other types.

use std::collections::HashMap;
use std::sync::Arc;

use docmodel_core::FieldType;
use docmodel_schema::{Bound, FieldSpec, ResolvedGraph, SchemaDescription};

use crate::error::SchemaBuildError;
use crate::field::{FieldDescriptor, Hook};
use crate::hooks::Hooks;
use crate::schema::{Schema, Upgrade, UpgradeFn};
use crate::value::{Fields, Value};

/// Upgraders keyed by schema name.
#[derive(Debug, Default, Clone)]
pub struct Upgraders(HashMap<String, Hook<UpgradeFn>>);

impl Upgraders {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the upgrader for `schema`.
    pub fn register<F>(mut self, schema: &str, func: F) -> Self
    where
        F: Fn(&Fields) -> Upgrade + Send + Sync + 'static,
    {
        self.0.insert(
            schema.to_string(),
            Hook::new(format!("{schema}Updater"), Arc::new(func) as Arc<UpgradeFn>),
        );
        self
    }

    fn get(&self, schema: &str) -> Option<&Hook<UpgradeFn>> {
        self.0.get(schema)
    }
}

/// Every runtime schema of a generation run, by name.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    schemas: HashMap<String, Arc<Schema>>,
    names: Vec<String>,
}

impl SchemaSet {
    /// Build runtime schemas for every schema in `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError`] for unregistered hook names,
    /// non-numeric bounds, or upgraders naming unknown schemas.
    pub fn build(
        graph: &ResolvedGraph,
        hooks: &Hooks,
        upgraders: &Upgraders,
    ) -> Result<Self, SchemaBuildError> {
        if let Some(unknown) = upgraders.0.keys().find(|name| graph.get(name).is_none()) {
            return Err(SchemaBuildError::UnknownUpgraderTarget {
                schema: unknown.clone(),
            });
        }

        let mut schemas: HashMap<String, Arc<Schema>> = HashMap::with_capacity(graph.len());
        for desc in graph.dependency_order() {
            let mut builder = Schema::builder(&desc.name, desc.version);
            for (name, spec) in &desc.fields {
                builder = builder.field(runtime_field(desc, name, spec, hooks, &schemas)?);
            }
            if let Some(hook) = upgraders.get(&desc.name) {
                builder = builder.upgrader_hook(hook.clone());
            }
            tracing::debug!(schema = %desc.name, version = desc.version, "built runtime schema");
            schemas.insert(desc.name.clone(), Arc::new(builder.build()));
        }

        Ok(Self {
            schemas,
            names: graph.names().into_iter().map(str::to_string).collect(),
        })
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Schema names in load order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn runtime_field(
    desc: &SchemaDescription,
    name: &str,
    spec: &FieldSpec,
    hooks: &Hooks,
    built: &HashMap<String, Arc<Schema>>,
) -> Result<FieldDescriptor, SchemaBuildError> {
    let unknown_hook = |kind: &'static str, hook: &str| SchemaBuildError::UnknownHook {
        schema: desc.name.clone(),
        field: name.to_string(),
        kind,
        name: hook.to_string(),
    };

    let bounded = matches!(spec.field_type, FieldType::String | FieldType::Number);
    let bound = |key: &'static str, bound: &Option<Bound>| match bound {
        Some(b) if bounded => b
            .as_f64()
            .map(Some)
            .ok_or_else(|| SchemaBuildError::InvalidBound {
                schema: desc.name.clone(),
                field: name.to_string(),
                key,
                value: b.to_string(),
            }),
        _ => Ok(None),
    };

    let mut field = FieldDescriptor::new(name, spec.field_type);
    field.is_array = spec.is_array;
    field.required = spec.required;
    field.default = spec.default.clone().map(Value::from_json);
    field.min = bound("min", &spec.min)?;
    field.max = bound("max", &spec.max)?;
    field.validate_fail_msg = spec.validate_fail_msg.clone();
    field.validate = spec
        .validate
        .as_deref()
        .map(|n| hooks.get_validator(n).ok_or_else(|| unknown_hook("validator", n)))
        .transpose()?;
    field.formatter = spec
        .formatter
        .as_deref()
        .map(|n| hooks.get_formatter(n).ok_or_else(|| unknown_hook("formatter", n)))
        .transpose()?;
    field.calculator = spec
        .calculator
        .as_deref()
        .map(|n| hooks.get_calculator(n).ok_or_else(|| unknown_hook("calculator", n)))
        .transpose()?;
    field.schema = spec
        .schema
        .as_ref()
        .map(|target| {
            built
                .get(target.name())
                .cloned()
                .ok_or_else(|| SchemaBuildError::MissingSubschema {
                    schema: desc.name.clone(),
                    field: name.to_string(),
                    target: target.name().to_string(),
                })
        })
        .transpose()?;
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmodel_schema::SchemaRegistry;
    use serde_json::json;

    fn graph(descs: Vec<serde_json::Value>) -> ResolvedGraph {
        let mut registry = SchemaRegistry::new();
        for (i, d) in descs.into_iter().enumerate() {
            registry.register(d, format!("d{i}")).unwrap();
        }
        registry.resolve().unwrap()
    }

    #[test]
    fn builds_subschemas_as_shared_handles() {
        let g = graph(vec![
            json!({ "name": "Person", "version": 1, "fields": {
                "home": { "type": "subschema", "schema": "Address" },
                "work": { "type": "subschema", "schema": "Address", "required": false }
            }}),
            json!({ "name": "Address", "version": 1, "fields": { "city": "string" } }),
        ]);
        let set = SchemaSet::build(&g, &Hooks::new(), &Upgraders::new()).unwrap();
        assert_eq!(set.names(), ["Person", "Address"]);

        let person = set.get("Person").unwrap();
        let home = person.field("home").unwrap().schema.clone().unwrap();
        let work = person.field("work").unwrap().schema.clone().unwrap();
        assert!(Arc::ptr_eq(&home, &work));
        assert!(Arc::ptr_eq(&home, &set.get("Address").unwrap()));
    }

    #[test]
    fn parses_bounds_and_defaults() {
        let g = graph(vec![json!({ "name": "P", "version": 1, "fields": {
            "code": { "type": "string", "min": "2", "max": 4 },
            "on": { "type": "date", "min": "2020-01-01" },
            "kind": { "type": "string", "default": "mobile" }
        }})]);
        let set = SchemaSet::build(&g, &Hooks::new(), &Upgraders::new()).unwrap();
        let p = set.get("P").unwrap();
        assert_eq!(p.field("code").unwrap().min, Some(2.0));
        assert_eq!(p.field("code").unwrap().max, Some(4.0));
        assert_eq!(p.field("on").unwrap().min, None);
        assert_eq!(p.field("kind").unwrap().default, Some(Value::from("mobile")));
    }

    #[test]
    fn non_numeric_bound_rejected() {
        let g = graph(vec![json!({ "name": "P", "version": 1, "fields": {
            "n": { "type": "number", "max": "lots" }
        }})]);
        let err = SchemaBuildError::InvalidBound {
            schema: "P".into(),
            field: "n".into(),
            key: "max",
            value: "lots".into(),
        };
        assert_eq!(SchemaSet::build(&g, &Hooks::new(), &Upgraders::new()).unwrap_err(), err);
    }

    #[test]
    fn unknown_hooks_rejected() {
        let g = graph(vec![json!({ "name": "P", "version": 1, "fields": {
            "zip": { "type": "string", "validate": "zipCode" }
        }})]);
        let err = SchemaSet::build(&g, &Hooks::new(), &Upgraders::new()).unwrap_err();
        assert!(matches!(err, SchemaBuildError::UnknownHook { kind: "validator", .. }));

        let hooks = Hooks::new().validator("zipCode", |_| Ok(true));
        assert!(SchemaSet::build(&g, &hooks, &Upgraders::new()).is_ok());
    }

    #[test]
    fn upgrader_for_unknown_schema_rejected() {
        let g = graph(vec![json!({ "name": "P", "version": 1, "fields": {} })]);
        let upgraders = Upgraders::new().register("Q", |_| Upgrade::unchanged());
        let err = SchemaSet::build(&g, &Hooks::new(), &upgraders).unwrap_err();
        assert!(matches!(err, SchemaBuildError::UnknownUpgraderTarget { .. }));
    }
}
