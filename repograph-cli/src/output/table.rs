//! Table output formatting using the `tabled` crate

use super::OutputConfig;
use tabled::{
    builder::Builder,
    settings::{object::Columns, style::Style, Alignment, Modify},
};

/// Table output formatter
pub struct TableOutput;

impl TableOutput {
    /// Two-column key/value table with right-aligned keys.
    pub fn format_key_value(pairs: &[(&str, String)], config: &OutputConfig) -> String {
        let mut builder = Builder::default();
        for (key, value) in pairs {
            builder.push_record([*key, value.as_str()]);
        }

        let mut table = builder.build();
        if config.compact {
            table.with(Style::blank());
        } else {
            table.with(Style::rounded());
        }
        table.with(Modify::new(Columns::first()).with(Alignment::right()));
        table.to_string()
    }

    /// Table with a header row. Columns listed in `numeric` are right-aligned.
    pub fn from_rows(
        headers: &[&str],
        rows: &[Vec<String>],
        numeric: &[usize],
        config: &OutputConfig,
    ) -> String {
        if rows.is_empty() {
            return "(no results)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(headers.iter().copied());
        for row in rows {
            builder.push_record(row.iter().map(|s| s.as_str()));
        }

        let mut table = builder.build();
        if config.compact {
            table.with(Style::blank());
        } else {
            table.with(Style::rounded());
        }
        for &column in numeric {
            table.with(Modify::new(Columns::single(column)).with(Alignment::right()));
        }
        table.to_string()
    }
}
