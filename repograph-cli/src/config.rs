//! Configuration loading from `.repograph.toml`.
//!
//! The file lives in the root of the repository being assessed. It is
//! optional; every section falls back to defaults when omitted.
//!
//! # Example Configuration
//!
//! ```toml
//! [scanner]
//! ignore = ["vendor/", "dist/"]
//! include_hidden = true
//! max_file_size_kb = 1024
//! capture_content = false
//!
//! [output]
//! format = "table"
//! color = true
//!
//! [rules]
//! high_dependency_density_threshold = 8.0
//! large_project_line_threshold = 10000
//! ```

use anyhow::{Context, Result};
use repograph_core::{AnalysisRules, FsScanner};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILENAME: &str = ".repograph.toml";

/// Root configuration loaded from `.repograph.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct RepographConfig {
    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub output: OutputSettings,

    /// Rule table overrides. Omitted keys keep the built-in tables.
    #[serde(default)]
    pub rules: AnalysisRules,
}

/// Scanner configuration controlling file discovery.
#[derive(Debug, Deserialize)]
pub struct ScannerConfig {
    /// Additional glob patterns to ignore, on top of `.gitignore` and
    /// `.repographignore` rules.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Whether to include dot-files and dot-directories.
    ///
    /// Defaults to `true` so CI configuration under `.github/` is assessed.
    #[serde(default = "default_include_hidden")]
    pub include_hidden: bool,

    /// Files larger than this (in kilobytes) are skipped.
    #[serde(default)]
    pub max_file_size_kb: Option<u64>,

    /// Keep raw text content on scanned files.
    #[serde(default)]
    pub capture_content: bool,
}

fn default_include_hidden() -> bool {
    true
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            include_hidden: true,
            max_file_size_kb: None,
            capture_content: false,
        }
    }
}

/// Output formatting preferences. Command-line flags take precedence.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// `table` or `json`.
    #[serde(default)]
    pub format: Option<String>,

    /// Force colors on or off; unset means auto-detect.
    #[serde(default)]
    pub color: Option<bool>,
}

/// Default ignore patterns that are always included.
const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules/",
    "bin/",
    "obj/",
    "target/",
    "__pycache__/",
    ".venv/",
    ".vs/",
    ".idea/",
];

impl RepographConfig {
    /// Load configuration from `root`. Read and parse errors are logged as
    /// warnings and defaults are used.
    pub fn load(root: &Path) -> Self {
        match Self::load_strict(root) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from `root`, failing on unreadable or invalid
    /// files. A missing file still yields defaults.
    pub fn load_strict(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", CONFIG_FILENAME))
    }

    /// User patterns first, then the defaults not already present.
    pub fn ignore_patterns(&self) -> Vec<String> {
        let mut patterns = self.scanner.ignore.clone();
        for default in DEFAULT_IGNORE_PATTERNS {
            if !patterns.iter().any(|p| p == default) {
                patterns.push(default.to_string());
            }
        }
        patterns
    }

    pub fn max_file_size_bytes(&self) -> Option<u64> {
        self.scanner.max_file_size_kb.map(|kb| kb * 1024)
    }

    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }

    /// Filesystem scanner configured from the `[scanner]` section.
    pub fn scanner(&self) -> FsScanner {
        FsScanner::new()
            .with_ignore_patterns(self.ignore_patterns())
            .skip_hidden(!self.scanner.include_hidden)
            .max_file_size_bytes(self.max_file_size_bytes())
            .capture_content(self.scanner.capture_content)
    }
}
