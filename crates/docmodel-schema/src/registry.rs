//! # Schema Registry
//!
//! Loads every `*.json` description in a source directory, checks each one
//! structurally as it is loaded, and indexes it by name.
//!
//! Files are loaded in sorted path order so that the registry (and every
//! error list or emitted index derived from it) is identical across runs
//! and platforms.
//!
//! The registry is the one-time load phase of a generation run. It is
//! consumed by [`SchemaRegistry::resolve`], which links subschemas and
//! rejects cycles; nothing mutates it afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::descriptor::SchemaId;
use crate::description::SchemaDescription;
use crate::error::GeneratorError;
use crate::resolve::{resolve, ResolvedGraph};

/// Name-indexed set of structurally checked, not yet resolved, schemas.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: Vec<SchemaDescription>,
    index: HashMap<String, SchemaId>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::NoInputFiles`] when the directory holds no
    /// description files, and the first load or structural error otherwise.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, GeneratorError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| GeneratorError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| GeneratorError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(GeneratorError::NoInputFiles {
                dir: dir.to_path_buf(),
            });
        }
        files.sort();

        let mut registry = Self::new();
        for path in &files {
            registry.load_file(path)?;
        }
        tracing::info!(
            dir = %dir.display(),
            schemas = registry.len(),
            "loaded schema descriptions"
        );
        Ok(registry)
    }

    /// Load and register a single description file.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Io`] or [`GeneratorError::Json`] when the
    /// file cannot be read or parsed, and any structural error from
    /// [`SchemaRegistry::register`].
    pub fn load_file(&mut self, path: &Path) -> Result<SchemaId, GeneratorError> {
        let content = fs::read_to_string(path).map_err(|source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| GeneratorError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let id = self.register(value, path.display().to_string())?;
        tracing::debug!(file = %path.display(), "loaded file");
        Ok(id)
    }

    /// Check a parsed description and add it to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::DuplicateSchema`] if the name is taken, or
    /// the structural error reported by [`SchemaDescription::from_json`].
    pub fn register(
        &mut self,
        value: Value,
        origin: impl Into<String>,
    ) -> Result<SchemaId, GeneratorError> {
        let origin = origin.into();
        let description = SchemaDescription::from_json(value, &origin)?;
        if self.index.contains_key(&description.name) {
            return Err(GeneratorError::DuplicateSchema {
                schema: description.name,
            });
        }
        let id = SchemaId(self.schemas.len());
        self.index.insert(description.name.clone(), id);
        self.schemas.push(description);
        Ok(id)
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<&SchemaDescription> {
        self.index.get(name).map(|id| &self.schemas[id.0])
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schema names in load order.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name.as_str()).collect()
    }

    /// Link subschema references, flag date-only users, and reject cycles.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::MissingSubschemaName`],
    /// [`GeneratorError::MissingSubschema`], or
    /// [`GeneratorError::CircularDependency`]. Any error aborts the run.
    pub fn resolve(self) -> Result<ResolvedGraph, GeneratorError> {
        resolve(self.schemas, self.index)
    }
}
