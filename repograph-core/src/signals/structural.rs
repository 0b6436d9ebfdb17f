//! Structural signals: runtime generation, version ranges, density, size,
//! language mix.

use std::collections::BTreeSet;

use crate::ordering::{fold_key, non_blank};
use crate::rules::AnalysisRules;
use crate::types::{
    ProjectStructuralSignals, RepositoryFileNode, RepositoryProjectNode,
    RepositoryStructuralSignals,
};

/// Derive a project's structural signals from its metrics and dependency summary.
pub fn project_signals(
    project: &RepositoryProjectNode,
    rules: &AnalysisRules,
) -> ProjectStructuralSignals {
    let framework = non_blank(project.framework.as_deref());
    let summary = &project.dependency_summary;

    ProjectStructuralSignals {
        is_legacy_dot_net_framework: framework.is_some_and(|f| rules.is_legacy_runtime(f)),
        is_modern_dot_net: framework.is_some_and(|f| rules.is_modern_runtime(f)),
        uses_version_ranges: summary.version_spec_count > 0,
        has_no_dependencies: summary.total_dependencies == 0,
        has_high_dependency_density: summary
            .dependencies_per_kloc
            .is_some_and(|density| density > rules.high_dependency_density_threshold),
        is_large_project: project.metrics.totals.total_lines_of_code
            >= rules.large_project_line_threshold,
        is_mixed_language: project.metrics.languages.len() > 1,
    }
}

/// Count distinct non-blank values ignoring case.
fn distinct_count<'a, I>(values: I) -> u64
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .filter_map(non_blank)
        .map(fold_key)
        .collect::<BTreeSet<_>>()
        .len() as u64
}

/// Repository signals: polyglot when more than one project type or more than
/// one file language is present.
pub fn repository_signals(
    projects: &[RepositoryProjectNode],
    files: &[RepositoryFileNode],
) -> RepositoryStructuralSignals {
    let distinct_project_type_count =
        distinct_count(projects.iter().map(|p| p.project_type.as_deref()));
    let distinct_language_count = distinct_count(files.iter().map(|f| f.language.as_deref()));

    RepositoryStructuralSignals {
        is_polyglot_repository: distinct_project_type_count > 1 || distinct_language_count > 1,
        distinct_project_type_count,
        distinct_language_count,
    }
}
