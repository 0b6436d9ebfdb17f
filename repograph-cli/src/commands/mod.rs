//! Command implementations for repograph CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod assess;
pub mod hash;

use anyhow::{Context, Result};
use repograph_core::{AnalysisRules, RepositoryGraphBuilder};
use std::path::{Path, PathBuf};

use crate::config::RepographConfig;

/// Resolved repository root plus its configuration.
pub struct Workspace {
    pub root: PathBuf,
    pub name: String,
    pub config: RepographConfig,
}

impl Workspace {
    /// Resolve `path`, load `.repograph.toml` from it and pick a repository
    /// name (the explicit one, else the directory name).
    pub fn open(path: &str, name: Option<&str>, strict: bool) -> Result<Self> {
        let root = Path::new(path)
            .canonicalize()
            .unwrap_or_else(|_| Path::new(path).to_path_buf());

        if !root.exists() {
            anyhow::bail!("Path does not exist: {}", root.display());
        }
        if !root.is_dir() {
            anyhow::bail!("Path is not a directory: {}", root.display());
        }

        let config = if strict {
            RepographConfig::load_strict(&root)?
        } else {
            RepographConfig::load(&root)
        };
        tracing::debug!("Loaded ignore patterns: {:?}", config.ignore_patterns());

        let name = name
            .map(str::to_string)
            .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "repository".to_string());

        Ok(Self { root, name, config })
    }

    /// Rule tables: a `--rules` file replaces the `[rules]` section.
    pub fn rules(&self, rules_path: Option<&str>) -> Result<AnalysisRules> {
        match rules_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read rules file {}", path))?;
                AnalysisRules::from_toml_str(&content)
                    .with_context(|| format!("Failed to parse rules file {}", path))
            }
            None => Ok(self.config.rules.clone()),
        }
    }

    /// Graph builder with the configured filesystem scanner.
    pub fn builder(&self, rules: AnalysisRules) -> RepositoryGraphBuilder {
        RepositoryGraphBuilder::new()
            .with_rules(rules)
            .scanner(self.config.scanner())
    }
}
