//! Metrics aggregation over file nodes.
//!
//! The same reducer runs over the whole repository and over each project
//! partition; only the partitioning differs.

use std::collections::BTreeMap;

use crate::ordering::{cmp_ignore_case, fold_key};
use crate::types::{LanguageBreakdown, Metrics, ProjectMetrics, RepositoryFileNode};

/// Reduce a collection of file nodes into totals in a single pass.
///
/// Binary files contribute to the file count and total size only. Text files
/// also add to the text size and, when a line count is present, to the line
/// total.
pub fn aggregate<'a, I>(files: I) -> Metrics
where
    I: IntoIterator<Item = &'a RepositoryFileNode>,
{
    files.into_iter().fold(Metrics::default(), |mut m, file| {
        m.total_files += 1;
        m.total_size_bytes += file.size_bytes;
        if file.is_binary {
            m.binary_files += 1;
        } else {
            m.text_files += 1;
            m.total_text_size_bytes += file.size_bytes;
            if let Some(lines) = file.line_count {
                m.total_lines_of_code += lines;
            }
        }
        m
    })
}

/// Group files by detected language.
///
/// Files without a language are left out. Ordered by descending file count,
/// then language name ignoring case.
pub fn language_breakdown<'a, I>(files: I) -> Vec<LanguageBreakdown>
where
    I: IntoIterator<Item = &'a RepositoryFileNode>,
{
    let mut groups: BTreeMap<String, LanguageBreakdown> = BTreeMap::new();
    for file in files {
        let Some(language) = file.language.as_deref().map(str::trim) else {
            continue;
        };
        if language.is_empty() {
            continue;
        }
        let entry = groups
            .entry(fold_key(language))
            .or_insert_with(|| LanguageBreakdown {
                language: language.to_string(),
                file_count: 0,
                lines_of_code: 0,
            });
        // Keep the ordinal-smallest spelling so the label is order-independent.
        if language < entry.language.as_str() {
            entry.language = language.to_string();
        }
        entry.file_count += 1;
        if !file.is_binary {
            entry.lines_of_code += file.line_count.unwrap_or(0);
        }
    }

    let mut breakdown: Vec<LanguageBreakdown> = groups.into_values().collect();
    breakdown.sort_by(|a, b| {
        b.file_count
            .cmp(&a.file_count)
            .then_with(|| cmp_ignore_case(&a.language, &b.language))
    });
    breakdown
}

/// Totals plus language breakdown for one project partition.
pub fn project_metrics(files: &[&RepositoryFileNode]) -> ProjectMetrics {
    ProjectMetrics {
        totals: aggregate(files.iter().copied()),
        languages: language_breakdown(files.iter().copied()),
    }
}
