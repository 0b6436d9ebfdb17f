//! Dependency summarization at project and repository level.

use std::collections::BTreeMap;

use crate::ordering::{cmp_ignore_case, fold_key, non_blank};
use crate::types::{
    DependencySummary, EcosystemCount, ProjectDependency, ProjectDependencyRank,
    RepositoryDependencySummary, RepositoryProjectNode,
};

/// Intended usage of a dependency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeBucket {
    Prod,
    Dev,
    Test,
    Peer,
    Optional,
    Other,
}

impl ScopeBucket {
    /// Classify a free-text scope. Blank or absent scopes are production.
    pub fn classify(scope: Option<&str>) -> Self {
        let Some(scope) = non_blank(scope) else {
            return ScopeBucket::Prod;
        };
        match scope.to_lowercase().as_str() {
            "prod" | "production" | "compile" | "runtime" => ScopeBucket::Prod,
            "dev" | "development" => ScopeBucket::Dev,
            "test" | "tests" => ScopeBucket::Test,
            "peer" => ScopeBucket::Peer,
            "optional" => ScopeBucket::Optional,
            _ => ScopeBucket::Other,
        }
    }
}

/// How precisely a dependency's version is pinned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionState {
    Exact,
    Spec,
    Unspecified,
}

impl VersionState {
    pub fn classify(dependency: &ProjectDependency) -> Self {
        if non_blank(dependency.version.as_deref()).is_some() {
            VersionState::Exact
        } else if non_blank(dependency.version_spec.as_deref()).is_some() {
            VersionState::Spec
        } else {
            VersionState::Unspecified
        }
    }
}

/// Dependencies per 1000 lines of code; `None` when there is no code.
pub fn dependencies_per_kloc(total_dependencies: u64, lines_of_code: u64) -> Option<f64> {
    (lines_of_code > 0).then(|| total_dependencies as f64 / (lines_of_code as f64 / 1000.0))
}

/// Case-insensitive ecosystem counter that remembers a stable spelling.
#[derive(Default)]
struct EcosystemTally {
    groups: BTreeMap<String, EcosystemCount>,
}

impl EcosystemTally {
    fn add(&mut self, ecosystem: &str, count: u64) {
        let ecosystem = ecosystem.trim();
        let entry = self
            .groups
            .entry(fold_key(ecosystem))
            .or_insert_with(|| EcosystemCount {
                ecosystem: ecosystem.to_string(),
                count: 0,
            });
        if ecosystem < entry.ecosystem.as_str() {
            entry.ecosystem = ecosystem.to_string();
        }
        entry.count += count;
    }

    fn into_sorted(self) -> Vec<EcosystemCount> {
        let mut counts: Vec<EcosystemCount> = self.groups.into_values().collect();
        counts.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| cmp_ignore_case(&a.ecosystem, &b.ecosystem))
        });
        counts
    }
}

/// Summarize one project's dependency list against its lines of code.
pub fn summarize_project(dependencies: &[ProjectDependency], lines_of_code: u64) -> DependencySummary {
    let mut summary = DependencySummary::default();
    let mut ecosystems = EcosystemTally::default();

    for dependency in dependencies {
        summary.total_dependencies += 1;

        match ScopeBucket::classify(dependency.scope.as_deref()) {
            ScopeBucket::Prod => summary.prod += 1,
            ScopeBucket::Dev => summary.dev += 1,
            ScopeBucket::Test => summary.test += 1,
            ScopeBucket::Peer => summary.peer += 1,
            ScopeBucket::Optional => summary.optional += 1,
            ScopeBucket::Other => summary.other += 1,
        }

        match VersionState::classify(dependency) {
            VersionState::Exact => summary.exact_version_count += 1,
            VersionState::Spec => summary.version_spec_count += 1,
            VersionState::Unspecified => summary.unspecified_version_count += 1,
        }

        ecosystems.add(dependency.ecosystem.as_deref().unwrap_or_default(), 1);
    }

    summary.dependencies_per_kloc = dependencies_per_kloc(summary.total_dependencies, lines_of_code);
    summary.ecosystems = ecosystems.into_sorted();
    summary
}

/// Roll project summaries up to the repository.
///
/// Bucket counts are summed, ecosystems merged ignoring case, density is
/// computed against `repository_lines_of_code`, and projects are ranked by
/// descending dependency count then name.
pub fn summarize_repository(
    projects: &[RepositoryProjectNode],
    repository_lines_of_code: u64,
) -> RepositoryDependencySummary {
    let mut summary = DependencySummary::default();
    let mut ecosystems = EcosystemTally::default();

    for project in projects {
        let p = &project.dependency_summary;
        summary.total_dependencies += p.total_dependencies;
        summary.prod += p.prod;
        summary.dev += p.dev;
        summary.test += p.test;
        summary.peer += p.peer;
        summary.optional += p.optional;
        summary.other += p.other;
        summary.exact_version_count += p.exact_version_count;
        summary.version_spec_count += p.version_spec_count;
        summary.unspecified_version_count += p.unspecified_version_count;
        for eco in &p.ecosystems {
            ecosystems.add(&eco.ecosystem, eco.count);
        }
    }

    summary.dependencies_per_kloc =
        dependencies_per_kloc(summary.total_dependencies, repository_lines_of_code);
    summary.ecosystems = ecosystems.into_sorted();

    let mut ranking: Vec<ProjectDependencyRank> = projects
        .iter()
        .map(|p| ProjectDependencyRank {
            project_id: p.id.clone(),
            project_name: p.name.clone(),
            dependency_count: p.dependency_summary.total_dependencies,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.dependency_count
            .cmp(&a.dependency_count)
            .then_with(|| cmp_ignore_case(&a.project_name, &b.project_name))
            .then_with(|| cmp_ignore_case(&a.project_id, &b.project_id))
    });

    RepositoryDependencySummary {
        summary,
        projects_by_dependency_count: ranking,
    }
}
