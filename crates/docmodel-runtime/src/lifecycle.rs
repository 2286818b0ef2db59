//! # Document Lifecycle
//!
//! Binds a raw document body to a schema.
//!
//! ## States
//!
//! ```text
//! Unbound ──bind──▶ Versioned(schema.version)
//! ```
//!
//! Binding reads the body's version tag:
//!
//! - absent or older than the schema: the upgrader runs once on the raw
//!   body, and a changed result replaces it;
//! - equal: nothing to do;
//! - newer: rejected, the body was written by a schema this process does
//!   not know.
//!
//! The (possibly upgraded) body's type tag must then equal the schema's
//! doctype. A body without a type tag is stamped; a mismatch is fatal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::schema::Schema;
use crate::value::{Fields, Value};

/// Control key holding the document type tag.
pub const DOCTYPE_KEY: &str = "doctype__";

/// Control key holding the schema version a document was written with.
pub const VERSION_KEY: &str = "schema_version__";

/// Lifecycle state of a document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentState {
    /// Not yet checked against a schema.
    Unbound,
    /// Tagged with the schema's doctype at the given version.
    Versioned(u32),
}

impl DocumentState {
    /// The bound version, if any.
    pub fn version(&self) -> Option<u32> {
        match self {
            Self::Unbound => None,
            Self::Versioned(v) => Some(*v),
        }
    }

    /// Bind `body` to `schema`, consuming the unbound state.
    ///
    /// # Errors
    ///
    /// [`DocumentError::FutureVersion`], [`DocumentError::WrongDocType`],
    /// or [`DocumentError::MalformedControlField`]. Binding an already
    /// versioned state only re-checks the tags.
    pub fn bind(self, schema: &Schema, mut body: Fields) -> Result<(Fields, Self), DocumentError> {
        let current = schema.version();
        let found = read_version(&body)?;

        match found {
            Some(v) if v > u64::from(current) => {
                return Err(DocumentError::FutureVersion {
                    schema: schema.name().to_string(),
                    found: v,
                    current,
                });
            }
            Some(v) if v == u64::from(current) => {}
            _ => {
                if let Some(upgraded) = schema.upgrade(&body) {
                    tracing::warn!(
                        schema = %schema.name(),
                        from = ?found,
                        to = current,
                        "upgraded document"
                    );
                    body = upgraded;
                }
            }
        }

        match body.get(DOCTYPE_KEY) {
            None | Some(Value::Null) => {
                body.insert(DOCTYPE_KEY.to_string(), Value::from(schema.doctype()));
            }
            Some(Value::String(tag)) if tag == schema.doctype() => {}
            Some(Value::String(tag)) => {
                return Err(DocumentError::WrongDocType {
                    expected: schema.doctype().to_string(),
                    found: tag.clone(),
                });
            }
            Some(_) => return Err(DocumentError::MalformedControlField { key: DOCTYPE_KEY }),
        }
        body.insert(VERSION_KEY.to_string(), Value::from(current));

        Ok((body, Self::Versioned(current)))
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => f.write_str("UNBOUND"),
            Self::Versioned(v) => write!(f, "VERSIONED({v})"),
        }
    }
}

fn read_version(body: &Fields) -> Result<Option<u64>, DocumentError> {
    match body.get(VERSION_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) if *n >= 0.0 && n.fract() == 0.0 => Ok(Some(*n as u64)),
        Some(_) => Err(DocumentError::MalformedControlField { key: VERSION_KEY }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Upgrade;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn body(pairs: &[(&str, Value)]) -> Fields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn unbound_body_is_stamped() {
        let schema = Schema::builder("Person", 2).build();
        let (bound, state) = DocumentState::Unbound.bind(&schema, Fields::new()).unwrap();
        assert_eq!(state, DocumentState::Versioned(2));
        assert_eq!(bound[DOCTYPE_KEY], Value::from("person"));
        assert_eq!(bound[VERSION_KEY], Value::from(2));
    }

    #[test]
    fn old_version_runs_upgrader_once_and_uses_its_output() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let schema = Schema::builder("Person", 2)
            .upgrader("personUpdater", move |doc| {
                seen.fetch_add(1, Ordering::SeqCst);
                let mut obj = doc.clone();
                obj.insert("upgraded".into(), Value::Bool(true));
                obj.insert(DOCTYPE_KEY.into(), Value::from("person"));
                Upgrade::changed(obj)
            })
            .build();

        let raw = body(&[(VERSION_KEY, Value::from(1)), (DOCTYPE_KEY, Value::from("legacy"))]);
        let (bound, _) = DocumentState::Unbound.bind(&schema, raw).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bound["upgraded"], Value::Bool(true));
        assert_eq!(bound[VERSION_KEY], Value::from(2));
    }

    #[test]
    fn current_version_skips_upgrader() {
        let schema = Schema::builder("P", 1)
            .upgrader("boom", |_| Upgrade::changed(Fields::new()))
            .build();
        let raw = body(&[(VERSION_KEY, Value::from(1)), ("x", Value::from(1))]);
        let (bound, _) = DocumentState::Unbound.bind(&schema, raw).unwrap();
        assert_eq!(bound["x"], Value::from(1));
    }

    #[test]
    fn future_version_rejected() {
        let schema = Schema::builder("P", 1).build();
        let raw = body(&[(VERSION_KEY, Value::from(5))]);
        let err = DocumentState::Unbound.bind(&schema, raw).unwrap_err();
        assert!(matches!(err, DocumentError::FutureVersion { found: 5, current: 1, .. }));
    }

    #[test]
    fn wrong_doctype_rejected() {
        let schema = Schema::builder("Person", 1).build();
        let raw = body(&[(DOCTYPE_KEY, Value::from("invoice"))]);
        let err = DocumentState::Unbound.bind(&schema, raw).unwrap_err();
        assert!(matches!(err, DocumentError::WrongDocType { ref found, .. } if found == "invoice"));
    }

    #[test]
    fn malformed_tags_rejected() {
        let schema = Schema::builder("Person", 1).build();
        let err = DocumentState::Unbound
            .bind(&schema, body(&[(VERSION_KEY, Value::from("one"))]))
            .unwrap_err();
        assert!(matches!(err, DocumentError::MalformedControlField { key: VERSION_KEY }));
        let err = DocumentState::Unbound
            .bind(&schema, body(&[(DOCTYPE_KEY, Value::from(3))]))
            .unwrap_err();
        assert!(matches!(err, DocumentError::MalformedControlField { key: DOCTYPE_KEY }));
    }
}
