//! Integration tests: build runtime schemas from resolved descriptions and
//! validate documents end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use docmodel_core::{DateOnly, FieldType};
use docmodel_runtime::{
    Document, DocumentError, FieldDescriptor, Fields, Hooks, Schema, SchemaSet, Upgrade, Upgraders,
    Value, DOCTYPE_KEY, VERSION_KEY,
};
use docmodel_schema::SchemaRegistry;
use proptest::prelude::*;
use serde_json::json;

fn schema_set(descs: Vec<serde_json::Value>, hooks: &Hooks, upgraders: &Upgraders) -> SchemaSet {
    let mut registry = SchemaRegistry::new();
    for (i, desc) in descs.into_iter().enumerate() {
        registry.register(desc, format!("desc{i}")).unwrap();
    }
    let graph = registry.resolve().unwrap();
    SchemaSet::build(&graph, hooks, upgraders).unwrap()
}

fn person_set() -> SchemaSet {
    schema_set(
        vec![json!({ "name": "Person", "version": 1, "fields": {
            "name": "string",
            "age": { "type": "number", "required": false, "min": 0, "max": 150 }
        }})],
        &Hooks::new(),
        &Upgraders::new(),
    )
}

#[test]
fn test_person_age_out_of_range() {
    let person = person_set().get("Person").unwrap();
    let doc = Document::from_json(person, json!({ "name": "Bob", "age": 200 })).unwrap();
    let result = doc.validation();
    assert!(!result.result);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field_name, "age");
    assert_eq!(result.errors[0].error, "age must be between 0-150");
}

#[test]
fn test_person_without_age_is_valid_and_untouched() {
    let person = person_set().get("Person").unwrap();
    let doc = Document::from_json(person, json!({ "name": "Bob" })).unwrap();
    assert!(doc.is_valid());
    assert_eq!(doc.get("age"), None);
    assert!(!doc.body().contains_key("age"));
}

#[test]
fn test_required_and_default() {
    let without_default = schema_set(
        vec![json!({ "name": "Flag", "version": 1, "fields": { "on": "boolean" } })],
        &Hooks::new(),
        &Upgraders::new(),
    );
    let doc = Document::from_json(without_default.get("Flag").unwrap(), json!({})).unwrap();
    assert!(!doc.is_valid());
    assert_eq!(doc.validation().errors.len(), 1);
    assert_eq!(doc.validation().errors[0].field_name, "on");

    let with_default = schema_set(
        vec![json!({ "name": "Flag", "version": 1, "fields": {
            "on": { "type": "boolean", "default": false }
        }})],
        &Hooks::new(),
        &Upgraders::new(),
    );
    let doc = Document::from_json(with_default.get("Flag").unwrap(), json!({})).unwrap();
    assert!(doc.is_valid());
    assert_eq!(doc.get("on"), Some(Value::Bool(false)));
}

#[test]
fn test_validator_template_from_description() {
    let hooks = Hooks::new().validator("never", |_| Ok(false));
    let set = schema_set(
        vec![json!({ "name": "Score", "version": 1, "fields": {
            "value": {
                "type": "number",
                "validate": "never",
                "validateFailMsg": "%v% is bad, got %t%"
            }
        }})],
        &hooks,
        &Upgraders::new(),
    );
    let doc = Document::from_json(set.get("Score").unwrap(), json!({ "value": 42 })).unwrap();
    assert_eq!(doc.validation().errors[0].error, "42 is bad, got number");
}

#[test]
fn test_validator_raise_aborts_construction() {
    let hooks = Hooks::new().validator("broken", |_| Err("lookup table missing".into()));
    let set = schema_set(
        vec![json!({ "name": "Zip", "version": 1, "fields": {
            "code": { "type": "string", "validate": "broken" }
        }})],
        &hooks,
        &Upgraders::new(),
    );
    let err = Document::from_json(set.get("Zip").unwrap(), json!({ "code": "x" })).unwrap_err();
    assert!(matches!(err, DocumentError::Validation(_)));
    assert!(err.to_string().contains("lookup table missing"));
}

#[test]
fn test_upgrader_runs_once_and_result_is_validated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let upgraders = Upgraders::new().register("Contact", move |doc| {
        counter.fetch_add(1, Ordering::SeqCst);
        let mut obj = doc.clone();
        if let Some(phone) = obj.remove("phone") {
            obj.insert("phones".into(), Value::Array(vec![phone]));
        }
        Upgrade::changed(obj)
    });
    let set = schema_set(
        vec![json!({ "name": "Contact", "version": 2, "fields": { "phones": ["string"] } })],
        &Hooks::new(),
        &upgraders,
    );

    let old = json!({ DOCTYPE_KEY: "contact", VERSION_KEY: 1, "phone": "555-0100" });
    let doc = Document::from_json(set.get("Contact").unwrap(), old).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(doc.is_valid(), "{:?}", doc.validation().errors);
    assert_eq!(doc.get("phones"), Some(Value::Array(vec![Value::from("555-0100")])));
    assert_eq!(doc.to_json()[VERSION_KEY], 2);
}

#[test]
fn test_wrong_doctype_is_fatal() {
    let person = person_set().get("Person").unwrap();
    let payload = json!({ DOCTYPE_KEY: "invoice", "name": "Bob" });
    let err = Document::from_json(person, payload).unwrap_err();
    assert!(matches!(err, DocumentError::WrongDocType { .. }));
}

#[test]
fn test_nested_person_graph() {
    let hooks = Hooks::new().formatter("digitsOnly", |v| match v {
        Value::String(s) => Value::String(s.chars().filter(char::is_ascii_digit).collect()),
        other => other,
    });
    let set = schema_set(
        vec![
            json!({ "name": "Person", "version": 1, "fields": {
                "name": "string",
                "born": { "type": "date", "required": false },
                "address": { "type": "subschema", "schema": "Address" },
                "phones": [{ "type": "subschema", "schema": "Phone", "required": false }]
            }}),
            json!({ "name": "Address", "version": 1, "fields": { "city": "string" } }),
            json!({ "name": "Phone", "version": 1, "fields": {
                "kind": { "type": "string", "default": "mobile" },
                "number": { "type": "string", "formatter": "digitsOnly" }
            }}),
        ],
        &hooks,
        &Upgraders::new(),
    );
    let person = set.get("Person").unwrap();

    let doc = Document::from_json(
        Arc::clone(&person),
        json!({
            "name": "Ann",
            "born": "1990-05-17",
            "address": { "city": "Oslo" },
            "phones": [{ "number": "555" }, {}]
        }),
    )
    .unwrap();
    let result = doc.validation();
    assert!(!result.result);
    let paths: Vec<&str> = result.errors.iter().map(|e| e.field_name.as_str()).collect();
    assert_eq!(paths, ["phones[1].number"]);
    assert_eq!(result.field("phones[0]"), Some(true));
    assert_eq!(result.field("address.city"), Some(true));

    assert_eq!(doc.get("born"), Some(Value::Date(DateOnly::from_ymd(1990, 5, 17).unwrap())));
    let json = doc.to_json();
    assert_eq!(json["born"], "1990-05-17");
    assert_eq!(json["phones"][0]["kind"], "mobile");

    let phone = set.get("Phone").unwrap();
    let mut p = Document::new(phone).unwrap();
    p.set("number", Some(Value::from("(555) 010-0"))).unwrap();
    assert_eq!(p.get("number"), Some(Value::from("5550100")));
    assert!(p.validate().unwrap().result);
}

#[test]
fn test_shared_schema_across_threads() {
    let person = person_set().get("Person").unwrap();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let schema = Arc::clone(&person);
            thread::spawn(move || {
                let payload = json!({ "name": format!("n{i}"), "age": i * 100 });
                let doc = Document::from_json(schema, payload).unwrap();
                doc.is_valid()
            })
        })
        .collect();
    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, [true, true, false, false]);
}

#[test]
fn test_buffer_shaped_subdocument_stays_a_document() {
    let set = schema_set(
        vec![
            json!({ "name": "Mail", "version": 1, "fields": {
                "file": { "type": "subschema", "schema": "Attachment" },
                "raw": { "type": "buffer", "required": false }
            }}),
            json!({ "name": "Attachment", "version": 1, "fields": {
                "type": "string",
                "data": ["number"]
            }}),
        ],
        &Hooks::new(),
        &Upgraders::new(),
    );
    let mail = set.get("Mail").unwrap();
    let payload = json!({
        "file": { "type": "Buffer", "data": [1, 2] },
        "raw": { "type": "Buffer", "data": [3] }
    });
    let doc = Document::from_json(mail, payload).unwrap();
    assert!(doc.is_valid(), "{:?}", doc.validation().errors);
    assert_eq!(doc.get("file").unwrap().type_name(), "object");
    assert_eq!(doc.get("raw"), Some(Value::Buffer(vec![3])));

    let json = doc.to_json();
    assert_eq!(json["file"], json!({ "type": "Buffer", "data": [1, 2] }));
    assert_eq!(json["raw"], json!({ "type": "Buffer", "data": [3] }));
}

proptest! {
    #[test]
    fn prop_scalar_array_errors_name_failing_indices(
        values in proptest::collection::vec(-20.0f64..20.0, 0..16)
    ) {
        let schema = Arc::new(
            Schema::builder("Series", 1)
                .field(FieldDescriptor::new("points", FieldType::Number).array().with_min(0.0))
                .build(),
        );
        let mut body = Fields::new();
        let points = values.iter().copied().map(Value::Number).collect();
        body.insert("points".into(), Value::Array(points));
        let result = schema.validate(&mut body).unwrap();

        let expected: Vec<String> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v < 0.0)
            .map(|(i, _)| format!("points[{i}]"))
            .collect();
        let actual: Vec<String> = result.errors.iter().map(|e| e.field_name.clone()).collect();
        prop_assert_eq!(actual, expected.clone());
        prop_assert_eq!(result.result, expected.is_empty());
        prop_assert_eq!(result.field("points"), Some(expected.is_empty()));
    }
}
