//! Output formatting for repograph CLI
//!
//! Two formats: table (human-readable summary) and json (the full
//! assessment, field names as in the graph model).

use clap::ValueEnum;
use serde::Serialize;
use std::io::IsTerminal;
use std::str::FromStr;

mod json;
mod table;

pub use self::json::JsonOutput;
pub use self::table::TableOutput;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary tables (default)
    #[default]
    Table,
    /// JSON for machine consumption
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// Configuration for output rendering
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub no_color: bool,
    /// Minified JSON, borderless tables
    pub compact: bool,
}

impl OutputConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            no_color: false,
            compact: false,
        }
    }

    /// Colors follow `color_override` when set, otherwise whether stdout
    /// is a terminal.
    pub fn auto_detect(format: OutputFormat, color_override: Option<bool>) -> Self {
        let use_color = color_override.unwrap_or_else(|| std::io::stdout().is_terminal());
        Self {
            format,
            no_color: !use_color,
            compact: false,
        }
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn use_colors(&self) -> bool {
        !self.no_color
    }
}

/// Types that can be rendered in every supported format.
pub trait Outputter: Serialize {
    fn to_table(&self, config: &OutputConfig) -> String;

    fn to_json(&self, config: &OutputConfig) -> String {
        JsonOutput::format(self, config)
    }

    fn render(&self, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Table => self.to_table(config),
            OutputFormat::Json => self.to_json(config),
        }
    }

    fn output(&self, config: &OutputConfig) {
        println!("{}", self.render(config));
    }
}

/// Flag > config file > table.
pub fn resolve_format(flag: Option<OutputFormat>, configured: Option<&str>) -> OutputFormat {
    flag.unwrap_or_else(|| {
        configured
            .and_then(|f| f.parse().ok())
            .unwrap_or_default()
    })
}

/// Render an optional ratio with two decimals, `-` when absent.
pub fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
