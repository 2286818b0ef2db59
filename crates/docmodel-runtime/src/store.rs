//! Persistence collaborator.
//!
//! The runtime does not talk to a database. It asks a [`DocumentStore`]
//! for a payload by id and gets back the payload, "not found", or a
//! failure. [`MemoryStore`] is the bundled implementation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::StoreError;

/// Source of persisted document payloads.
pub trait DocumentStore {
    /// Fetch the payload stored under `id`. `Ok(None)` means not found.
    fn get(&self, id: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Store `payload` under `id`, replacing any previous payload.
    fn put(&self, id: &str, payload: serde_json::Value) -> Result<(), StoreError>;
}

/// Thread-safe, cloneable in-memory store. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a payload, returning it if present.
    pub fn remove(&self, id: &str) -> Option<serde_json::Value> {
        self.data.write().remove(id)
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.data.read().get(id).cloned())
    }

    fn put(&self, id: &str, payload: serde_json::Value) -> Result<(), StoreError> {
        self.data.write().insert(id.to_string(), payload);
        Ok(())
    }
}
