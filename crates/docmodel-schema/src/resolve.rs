//! # Subschema Resolution & Cycle Detection
//!
//! Turns a registry of independently checked descriptions into a
//! [`ResolvedGraph`]:
//!
//! 1. Every `subschema` field's name reference is looked up and replaced by
//!    a [`SubschemaRef::Linked`] arena index; the name is recorded in the
//!    owning schema's import list.
//! 2. Schemas with a `date` field are flagged as needing the date-only type.
//! 3. The reference graph is walked depth-first. A reference to a schema
//!    still on the walk stack is a cycle; the walk reports the path of that
//!    first back edge.
//!
//! Schemas reached along two different paths (a diamond) are not cycles:
//! only a schema still on the current walk stack counts.

use std::collections::HashMap;

use docmodel_core::FieldType;

use crate::descriptor::{FieldSpec, SchemaId, SubschemaRef};
use crate::description::SchemaDescription;
use crate::error::GeneratorError;

/// A fully resolved, acyclic set of schemas.
///
/// This is the generator's sole output contract: the emitter receives it
/// and nothing else.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    schemas: Vec<SchemaDescription>,
    index: HashMap<String, SchemaId>,
}

impl ResolvedGraph {
    /// Number of schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schemas in load order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaDescription> {
        self.schemas.iter()
    }

    /// Schema names in load order.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name.as_str()).collect()
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<&SchemaDescription> {
        self.index.get(name).map(|id| &self.schemas[id.0])
    }

    /// Look up a schema by arena index.
    pub fn by_id(&self, id: SchemaId) -> Option<&SchemaDescription> {
        self.schemas.get(id.0)
    }

    /// The schema a `subschema` field refers to.
    pub fn subschema_of(&self, spec: &FieldSpec) -> Option<&SchemaDescription> {
        spec.linked_subschema().and_then(|id| self.by_id(id))
    }

    /// Schemas ordered so that every schema follows all schemas it refers to.
    pub fn dependency_order(&self) -> Vec<&SchemaDescription> {
        let mut placed = vec![false; self.schemas.len()];
        let mut order = Vec::with_capacity(self.schemas.len());
        for id in 0..self.schemas.len() {
            self.place(SchemaId(id), &mut placed, &mut order);
        }
        order
    }

    fn place<'a>(
        &'a self,
        id: SchemaId,
        placed: &mut [bool],
        order: &mut Vec<&'a SchemaDescription>,
    ) {
        if placed[id.0] {
            return;
        }
        placed[id.0] = true;
        let schema = &self.schemas[id.0];
        for (_, spec) in &schema.fields {
            if let Some(target) = spec.linked_subschema() {
                self.place(target, placed, order);
            }
        }
        order.push(schema);
    }
}

/// Resolve `schemas` against `index`. See the module docs for the steps.
pub(crate) fn resolve(
    mut schemas: Vec<SchemaDescription>,
    index: HashMap<String, SchemaId>,
) -> Result<ResolvedGraph, GeneratorError> {
    for schema in &mut schemas {
        link_subschemas(schema, &index)?;
        schema.requires_date_only = schema
            .fields
            .iter()
            .any(|(_, spec)| spec.field_type == FieldType::Date);
    }

    check_acyclic(&schemas)?;

    tracing::debug!(schemas = schemas.len(), "resolved schema graph");
    Ok(ResolvedGraph { schemas, index })
}

fn link_subschemas(
    schema: &mut SchemaDescription,
    index: &HashMap<String, SchemaId>,
) -> Result<(), GeneratorError> {
    let mut imports: Vec<String> = Vec::new();
    for (field_name, spec) in &mut schema.fields {
        if !spec.field_type.is_subschema() {
            continue;
        }
        let target = spec
            .schema
            .as_ref()
            .map(|r| r.name().to_string())
            .ok_or_else(|| GeneratorError::MissingSubschemaName {
                schema: schema.name.clone(),
                field: field_name.clone(),
            })?;
        let id = index
            .get(&target)
            .copied()
            .ok_or_else(|| GeneratorError::MissingSubschema {
                schema: schema.name.clone(),
                field: field_name.clone(),
                target: target.clone(),
            })?;

        tracing::debug!(
            schema = %schema.name,
            field = %field_name,
            target = %target,
            "linked subschema"
        );
        if !imports.contains(&target) {
            imports.push(target.clone());
        }
        spec.schema = Some(SubschemaRef::Linked { name: target, id });
    }
    schema.imports = imports;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// One followed reference: `schemas[from].field -> ...`.
struct Edge<'a> {
    from: SchemaId,
    field: &'a str,
}

fn check_acyclic(schemas: &[SchemaDescription]) -> Result<(), GeneratorError> {
    let mut marks = vec![Mark::Unvisited; schemas.len()];
    let mut stack: Vec<Edge<'_>> = Vec::new();
    for id in 0..schemas.len() {
        if marks[id] == Mark::Unvisited {
            visit(schemas, SchemaId(id), &mut marks, &mut stack)?;
        }
    }
    Ok(())
}

fn visit<'a>(
    schemas: &'a [SchemaDescription],
    id: SchemaId,
    marks: &mut [Mark],
    stack: &mut Vec<Edge<'a>>,
) -> Result<(), GeneratorError> {
    marks[id.0] = Mark::OnStack;
    let schema = &schemas[id.0];
    for (field_name, spec) in &schema.fields {
        let Some(target) = spec.linked_subschema() else {
            continue;
        };
        stack.push(Edge {
            from: id,
            field: field_name,
        });
        match marks[target.0] {
            Mark::OnStack => return Err(cycle_error(schemas, target, stack)),
            Mark::Unvisited => visit(schemas, target, marks, stack)?,
            Mark::Done => {}
        }
        stack.pop();
    }
    marks[id.0] = Mark::Done;
    Ok(())
}

fn cycle_error(
    schemas: &[SchemaDescription],
    target: SchemaId,
    stack: &[Edge<'_>],
) -> GeneratorError {
    let start = stack.iter().position(|e| e.from == target).unwrap_or(0);
    let mut path: Vec<String> = stack[start..]
        .iter()
        .map(|e| format!("{}.{}", schemas[e.from.0].name, e.field))
        .collect();
    path.push(schemas[target.0].name.clone());
    GeneratorError::CircularDependency {
        schema: schemas[target.0].name.clone(),
        path: path.join(" -> "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SchemaRegistry;
    use serde_json::{json, Value};

    fn registry(descs: Vec<Value>) -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        for (i, desc) in descs.into_iter().enumerate() {
            registry.register(desc, format!("desc{i}")).unwrap();
        }
        registry
    }

    fn sub(name: &str) -> Value {
        json!({ "type": "subschema", "schema": name })
    }

    #[test]
    fn test_links_and_imports() {
        let graph = registry(vec![
            json!({ "name": "Person", "version": 1, "fields": {
                "home": sub("Address"), "work": sub("Address"), "phones": [sub("Phone")]
            }}),
            json!({ "name": "Address", "version": 1, "fields": { "city": "string" } }),
            json!({ "name": "Phone", "version": 1, "fields": { "number": "string" } }),
        ])
        .resolve()
        .unwrap();

        let person = graph.get("Person").unwrap();
        assert_eq!(person.imports, ["Address", "Phone"]);
        let home = person.field("home").unwrap();
        assert_eq!(graph.subschema_of(home).unwrap().name, "Address");
        let phones = person.field("phones").unwrap();
        assert!(phones.is_array);
        assert_eq!(graph.subschema_of(phones).unwrap().name, "Phone");
    }

    #[test]
    fn test_missing_schema_property() {
        let err = registry(vec![json!({ "name": "A", "version": 1, "fields": {
            "b": { "type": "subschema" }
        }})])
        .resolve()
        .unwrap_err();
        assert!(matches!(err, GeneratorError::MissingSubschemaName { .. }));
    }

    #[test]
    fn test_missing_subschema() {
        let err = registry(vec![json!({ "name": "A", "version": 1, "fields": { "b": sub("B") } })])
            .resolve()
            .unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::MissingSubschema { ref target, .. } if target == "B"
        ));
    }

    #[test]
    fn test_mutual_reference_is_cycle() {
        let err = registry(vec![
            json!({ "name": "A", "version": 1, "fields": { "b": sub("B") } }),
            json!({ "name": "B", "version": 1, "fields": { "a": sub("A") } }),
        ])
        .resolve()
        .unwrap_err();
        match err {
            GeneratorError::CircularDependency { schema, path } => {
                assert_eq!(schema, "A");
                assert_eq!(path, "A.b -> B.a -> A");
            }
            other => panic!("expected CircularDependency, got {other}"),
        }
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let err = registry(vec![json!({ "name": "Node", "version": 1, "fields": {
            "children": [sub("Node")]
        }})])
        .resolve()
        .unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::CircularDependency { ref path, .. } if path == "Node.children -> Node"
        ));
    }

    #[test]
    fn test_cycle_path_excludes_entry_edges() {
        // Root -> A -> B -> A: the report names only the A/B loop.
        let err = registry(vec![
            json!({ "name": "Root", "version": 1, "fields": { "a": sub("A") } }),
            json!({ "name": "A", "version": 1, "fields": { "b": sub("B") } }),
            json!({ "name": "B", "version": 1, "fields": { "a": sub("A") } }),
        ])
        .resolve()
        .unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::CircularDependency { ref path, .. } if path == "A.b -> B.a -> A"
        ));
    }

    #[test]
    fn test_long_chain_is_acyclic() {
        let n = 20;
        let descs = (0..n)
            .map(|i| {
                let fields = if i + 1 < n {
                    json!({ "next": sub(&format!("S{}", i + 1)) })
                } else {
                    json!({ "leaf": "string" })
                };
                json!({ "name": format!("S{i}"), "version": 1, "fields": fields })
            })
            .collect();
        let graph = registry(descs).resolve().unwrap();
        assert_eq!(graph.len(), n);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let graph = registry(vec![
            json!({ "name": "Top", "version": 1, "fields": {
                "l": sub("Left"),
                "r": sub("Right")
            }}),
            json!({ "name": "Left", "version": 1, "fields": { "s": sub("Shared") } }),
            json!({ "name": "Right", "version": 1, "fields": { "s": sub("Shared") } }),
            json!({ "name": "Shared", "version": 1, "fields": { "x": "number" } }),
        ])
        .resolve()
        .unwrap();
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_date_only_flag() {
        let graph = registry(vec![
            json!({ "name": "Event", "version": 1, "fields": { "on": "date" } }),
            json!({ "name": "Log", "version": 1, "fields": { "at": "datetime" } }),
        ])
        .resolve()
        .unwrap();
        assert!(graph.get("Event").unwrap().requires_date_only);
        assert!(!graph.get("Log").unwrap().requires_date_only);
    }

    #[test]
    fn test_dependency_order_puts_dependencies_first() {
        let graph = registry(vec![
            json!({ "name": "Person", "version": 1, "fields": { "home": sub("Address") } }),
            json!({ "name": "Address", "version": 1, "fields": { "geo": sub("Geo") } }),
            json!({ "name": "Geo", "version": 1, "fields": { "lat": "number" } }),
        ])
        .resolve()
        .unwrap();
        let order: Vec<&str> = graph.dependency_order().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(order, ["Geo", "Address", "Person"]);
    }
}
