//! Hash command - Print the content hash of a repository without analysing it
//!
//! Runs only the scan stage. The printed hash is what `assess --since`
//! compares against.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use super::Workspace;
use crate::output::{resolve_format, OutputConfig, OutputFormat, Outputter, TableOutput};

/// Output of `repograph hash`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashReport {
    pub repository_name: String,
    pub root_path: String,
    pub repository_hash: String,
    pub total_files: u64,
    pub total_lines_of_code: u64,
}

impl Outputter for HashReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        if config.compact {
            return self.repository_hash.clone();
        }
        let pairs = vec![
            ("Repository", self.repository_name.clone()),
            ("Root", self.root_path.clone()),
            ("Files", self.total_files.to_string()),
            ("Lines of code", self.total_lines_of_code.to_string()),
            ("Hash", self.repository_hash.green().to_string()),
        ];
        TableOutput::format_key_value(&pairs, config)
    }
}

pub fn run(
    path: &str,
    name: Option<&str>,
    strict: bool,
    compact: bool,
    format: Option<OutputFormat>,
) -> Result<()> {
    let workspace = Workspace::open(path, name, strict)?;
    let rules = workspace.rules(None)?;
    let prepared = workspace
        .builder(rules)
        .prepare(&workspace.root, &workspace.name)
        .with_context(|| format!("Failed to scan {}", workspace.root.display()))?;

    let report = HashReport {
        repository_name: prepared.repository_name,
        root_path: prepared.root_path,
        repository_hash: prepared.repository_hash,
        total_files: prepared.metrics.total_files,
        total_lines_of_code: prepared.metrics.total_lines_of_code,
    };

    let format = resolve_format(format, workspace.config.default_format());
    let config = OutputConfig::auto_detect(format, workspace.config.use_color()).compact(compact);
    if !config.use_colors() {
        colored::control::set_override(false);
    }
    report.output(&config);
    Ok(())
}
