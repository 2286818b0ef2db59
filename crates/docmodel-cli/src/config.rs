//! # Generator Configuration File
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! src: schemas
//! out: models
//! force: false
//! pkg_path: docmodel-runtime
//! ```
//!
//! Relative `src` and `out` are resolved against the directory holding the
//! file. Command-line flags override every value here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::resolve_path;

/// Package path used when neither flag nor file sets one.
pub const DEFAULT_PKG_PATH: &str = "docmodel-runtime";

/// Values read from a configuration file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Directory of schema description files.
    pub src: Option<PathBuf>,
    /// Existing directory receiving artifacts.
    pub out: Option<PathBuf>,
    /// Overwrite existing artifacts.
    pub force: Option<bool>,
    /// Package path emitted artifacts import the runtime from.
    pub pkg_path: Option<String>,
}

impl GeneratorConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.src = config.src.map(|p| resolve_path(&p, base));
        config.out = config.out.map(|p| resolve_path(&p, base));

        tracing::debug!(config = %path.display(), "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docmodel.yaml");
        std::fs::write(&path, "src: schemas\nout: /tmp/models\nforce: true\n").unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.src, Some(dir.path().join("schemas")));
        assert_eq!(config.out, Some(PathBuf::from("/tmp/models")));
        assert_eq!(config.force, Some(true));
        assert_eq!(config.pkg_path, None);
    }

    #[test]
    fn unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docmodel.yaml");
        std::fs::write(&path, "source: schemas\n").unwrap();
        let err = GeneratorConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn missing_file_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = GeneratorConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
