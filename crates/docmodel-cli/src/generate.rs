//! # Generate and Check Subcommands
//!
//! `generate` runs the whole pipeline: load every description in the source
//! directory, resolve subschema links, reject cycles, then emit one
//! manifest per schema plus the initializer index. `check` stops after
//! resolution.
//!
//! Load and resolution errors abort the run before anything is written.
//! Emission errors are per schema: the rest are still written and the
//! command exits with status 1.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use docmodel_schema::{emit_all, EmitOptions, ManifestEmitter, ResolvedGraph, SchemaRegistry};

use crate::config::{GeneratorConfig, DEFAULT_PKG_PATH};

/// Arguments for `docmodel-gen generate`.
#[derive(Args, Debug, Default, Clone)]
pub struct GenerateArgs {
    /// Directory of schema description files.
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Existing directory receiving the generated artifacts.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Overwrite artifacts that already exist.
    #[arg(long)]
    pub force: bool,

    /// Package path generated artifacts import the runtime from.
    #[arg(long, value_name = "PATH")]
    pub pkg_path: Option<String>,
}

/// Arguments for `docmodel-gen check`.
#[derive(Args, Debug, Default, Clone)]
pub struct CheckArgs {
    /// Directory of schema description files.
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,
}

/// Effective settings after flags override the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSettings {
    /// Source directory.
    pub src: PathBuf,
    /// Output directory.
    pub out: PathBuf,
    /// Overwrite existing artifacts.
    pub force: bool,
    /// Runtime package path.
    pub pkg_path: String,
}

impl GenerateSettings {
    /// Merge flags over configuration values.
    pub fn merge(args: &GenerateArgs, config: &GeneratorConfig) -> Result<Self> {
        let Some(src) = args.src.clone().or_else(|| config.src.clone()) else {
            bail!("no source directory: pass --src or set `src` in the config file");
        };
        let Some(out) = args.out.clone().or_else(|| config.out.clone()) else {
            bail!("no output directory: pass --out or set `out` in the config file");
        };
        Ok(Self {
            src,
            out,
            force: args.force || config.force.unwrap_or(false),
            pkg_path: args
                .pkg_path
                .clone()
                .or_else(|| config.pkg_path.clone())
                .unwrap_or_else(|| DEFAULT_PKG_PATH.to_string()),
        })
    }
}

/// Execute `generate`. Returns 0 when every artifact was written, 1 otherwise.
pub fn run_generate(args: &GenerateArgs, config: &GeneratorConfig) -> Result<u8> {
    let settings = GenerateSettings::merge(args, config)?;
    require_dir(&settings.src, "source")?;
    require_dir(&settings.out, "output")?;

    let graph = load_and_resolve(&settings.src)?;

    let mut emitter = ManifestEmitter::new(EmitOptions {
        out_dir: settings.out.clone(),
        force: settings.force,
        pkg_path: settings.pkg_path.clone(),
    });
    let report = emit_all(&mut emitter, &graph);

    println!(
        "Generated {} artifact(s) for {} schema(s) in {}",
        report.written.len(),
        graph.len(),
        settings.out.display()
    );
    for failure in &report.failures {
        println!("  FAIL: {failure}");
    }
    tracing::info!(
        written = report.written.len(),
        failed = report.failures.len(),
        "generation finished"
    );

    Ok(if report.is_success() { 0 } else { 1 })
}

/// Execute `check`. Returns 0 when every description loads and resolves.
pub fn run_check(args: &CheckArgs, config: &GeneratorConfig) -> Result<u8> {
    let Some(src) = args.src.clone().or_else(|| config.src.clone()) else {
        bail!("no source directory: pass --src or set `src` in the config file");
    };
    require_dir(&src, "source")?;

    let graph = load_and_resolve(&src)?;
    println!("OK: {} schema(s) resolved from {}", graph.len(), src.display());
    for name in graph.names() {
        println!("  {name}");
    }
    Ok(0)
}

fn load_and_resolve(src: &Path) -> Result<ResolvedGraph> {
    let registry = SchemaRegistry::load_dir(src)
        .with_context(|| format!("failed to load schema descriptions from {}", src.display()))?;
    registry.resolve().context("failed to resolve schemas")
}

fn require_dir(path: &Path, what: &str) -> Result<()> {
    if !path.is_dir() {
        bail!("{what} directory {} does not exist", path.display());
    }
    Ok(())
}
