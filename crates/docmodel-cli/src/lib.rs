//! # docmodel-cli — Document-Model Generator CLI
//!
//! Provides the `docmodel-gen` command-line interface over
//! `docmodel-schema`.
//!
//! ## Subcommands
//!
//! - `docmodel-gen generate`: load, resolve and emit manifests.
//! - `docmodel-gen check`: load and resolve only.
//!
//! ```bash
//! docmodel-gen generate --src schemas --out models
//! docmodel-gen --config docmodel.yaml generate --force
//! docmodel-gen check --src schemas
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live here and return an
//!   exit code.
//! - Handlers delegate to `docmodel-schema`; no schema logic here.

pub mod config;
pub mod generate;

use std::path::{Path, PathBuf};

/// Resolve a path that may be relative to `base`.
///
/// Absolute paths are returned as-is; relative paths are joined onto
/// `base`.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
