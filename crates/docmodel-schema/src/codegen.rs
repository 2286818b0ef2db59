//! # Artifact Emission
//!
//! The generator's last phase. An [`Emitter`] receives the fully
//! [`ResolvedGraph`] and nothing else; it is never handed a schema that
//! failed resolution.
//!
//! The bundled [`ManifestEmitter`] writes one `<Name>.json` manifest per
//! schema plus a `models.json` initializer index. Runtime schemas are built
//! in process from the [`ResolvedGraph`], not from these files.
//!
//! Unlike load and resolution errors, emission errors are per artifact:
//! [`emit_all`] records the failure for that schema and keeps going.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::descriptor::FieldSpec;
use crate::description::SchemaDescription;
use crate::error::GeneratorError;
use crate::resolve::ResolvedGraph;

/// File name of the initializer index.
pub const INITIALIZER_FILE: &str = "models.json";

/// Where and how artifacts are written.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Existing output directory.
    pub out_dir: PathBuf,
    /// Overwrite existing artifacts.
    pub force: bool,
    /// Package path emitted artifacts import the runtime from.
    pub pkg_path: String,
}

/// Consumer of a resolved schema graph.
pub trait Emitter {
    /// Emit the artifact for one schema, returning the path written.
    fn emit_schema(
        &mut self,
        graph: &ResolvedGraph,
        schema: &SchemaDescription,
    ) -> Result<PathBuf, GeneratorError>;

    /// Emit the index that registers every schema, returning the path written.
    fn emit_initializer(&mut self, graph: &ResolvedGraph) -> Result<PathBuf, GeneratorError>;
}

/// Outcome of [`emit_all`].
#[derive(Debug, Default)]
pub struct EmitReport {
    /// Artifacts written, in emission order.
    pub written: Vec<PathBuf>,
    /// Per-artifact failures.
    pub failures: Vec<GeneratorError>,
}

impl EmitReport {
    /// Whether every artifact was written.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Emit every schema in load order, then the initializer.
pub fn emit_all(emitter: &mut dyn Emitter, graph: &ResolvedGraph) -> EmitReport {
    let mut report = EmitReport::default();
    for schema in graph.iter() {
        match emitter.emit_schema(graph, schema) {
            Ok(path) => {
                tracing::info!(schema = %schema.name, path = %path.display(), "emitted schema");
                report.written.push(path);
            }
            Err(err) => {
                tracing::error!(schema = %schema.name, error = %err, "failed to emit schema");
                report.failures.push(err);
            }
        }
    }
    match emitter.emit_initializer(graph) {
        Ok(path) => report.written.push(path),
        Err(err) => {
            tracing::error!(error = %err, "failed to emit initializer");
            report.failures.push(err);
        }
    }
    report
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemaManifest<'a> {
    name: &'a str,
    doctype: String,
    version: u32,
    package: &'a str,
    imports: &'a [String],
    requires_date_only: bool,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    custom_import_lines: &'a [String],
    fields: Vec<ManifestField<'a>>,
}

#[derive(Serialize)]
struct ManifestField<'a> {
    name: &'a str,
    #[serde(flatten)]
    spec: &'a FieldSpec,
}

#[derive(Serialize)]
struct InitializerManifest<'a> {
    package: &'a str,
    models: Vec<&'a str>,
}

/// Writes JSON manifests into [`EmitOptions::out_dir`].
#[derive(Debug)]
pub struct ManifestEmitter {
    options: EmitOptions,
}

impl ManifestEmitter {
    /// Create an emitter.
    pub fn new(options: EmitOptions) -> Self {
        Self { options }
    }

    /// Path of the manifest for `schema`.
    pub fn manifest_path(&self, schema: &SchemaDescription) -> PathBuf {
        self.options.out_dir.join(format!("{}.json", schema.name))
    }

    fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), GeneratorError> {
        if !self.options.force && path.exists() {
            return Err(GeneratorError::OutputExists {
                path: path.to_path_buf(),
            });
        }
        let mut content =
            serde_json::to_string_pretty(value).map_err(|source| GeneratorError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        content.push('\n');
        fs::write(path, content).map_err(|source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Emitter for ManifestEmitter {
    fn emit_schema(
        &mut self,
        _graph: &ResolvedGraph,
        schema: &SchemaDescription,
    ) -> Result<PathBuf, GeneratorError> {
        let manifest = SchemaManifest {
            name: &schema.name,
            doctype: schema.doctype(),
            version: schema.version,
            package: &self.options.pkg_path,
            imports: &schema.imports,
            requires_date_only: schema.requires_date_only,
            custom_import_lines: &schema.custom_import_lines,
            fields: schema
                .fields
                .iter()
                .map(|(name, spec)| ManifestField { name, spec })
                .collect(),
        };
        let path = self.manifest_path(schema);
        self.write(&path, &manifest)?;
        Ok(path)
    }

    fn emit_initializer(&mut self, graph: &ResolvedGraph) -> Result<PathBuf, GeneratorError> {
        let index = InitializerManifest {
            package: &self.options.pkg_path,
            models: graph.names(),
        };
        let path = self.options.out_dir.join(INITIALIZER_FILE);
        self.write(&path, &index)?;
        Ok(path)
    }
}
