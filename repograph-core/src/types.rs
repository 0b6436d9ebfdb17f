//! Data model for the repository graph.
//!
//! Everything here serializes with camelCase field names so the JSON
//! produced for presentation layers mirrors the entity names (`files`,
//! `projects`, `dependencySummary`, `repositoryHash`, ...). Optional facts
//! are `Option` and serialize as `null`; zero and absent are never conflated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Graph
// ============================================================================

/// Root aggregate produced by one assessment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryGraph {
    pub metadata: RepositoryMetadata,
    /// File nodes, unique by path, ordered by path ignoring case.
    pub files: Vec<RepositoryFileNode>,
    /// Project nodes, unique by id, ordered by id ignoring case.
    pub projects: Vec<RepositoryProjectNode>,
    pub technologies: Vec<TechnologyDetection>,
    pub metrics: Metrics,
    pub dependency_summary: RepositoryDependencySummary,
    pub structural_signals: RepositoryStructuralSignals,
    pub architecture_signals: RepositoryArchitectureSignals,
    pub modernization_signals: RepositoryModernizationSignals,
}

impl RepositoryGraph {
    /// Look up a project by id.
    pub fn project(&self, id: &str) -> Option<&RepositoryProjectNode> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Look up a file by its relative path.
    pub fn file(&self, path: &str) -> Option<&RepositoryFileNode> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Files linked to the given project.
    pub fn files_for_project<'a>(
        &'a self,
        project_id: &'a str,
    ) -> impl Iterator<Item = &'a RepositoryFileNode> + 'a {
        self.files
            .iter()
            .filter(move |f| f.project_id.as_deref() == Some(project_id))
    }
}

/// Descriptive metadata about the assessed repository.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetadata {
    pub root_path: String,
    pub repository_name: String,
    pub repository_hash: String,
    pub assessed_at: DateTime<Utc>,
}

// ============================================================================
// Nodes
// ============================================================================

/// One scanned file plus its detected language and project assignment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFileNode {
    /// Relative path from the repository root, `/`-separated.
    pub path: String,
    pub extension: String,
    pub size_bytes: u64,
    pub is_binary: bool,
    pub content_hash: String,
    pub line_count: Option<u64>,
    pub language: Option<String>,
    pub project_id: Option<String>,
}

/// A detected logical sub-unit of the repository.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryProjectNode {
    pub id: String,
    pub name: String,
    /// Target framework moniker, e.g. `net48` or `net8.0`.
    pub framework: Option<String>,
    pub project_type: Option<String>,
    pub root_path: Option<String>,
    pub dependencies: Vec<ProjectDependency>,
    pub metrics: ProjectMetrics,
    pub dependency_summary: DependencySummary,
    pub structural_signals: ProjectStructuralSignals,
    pub architecture_signals: ProjectArchitectureSignals,
    pub modernization_signals: Option<ModernizationSignals>,
}

/// A raw dependency record as reported by the dependency extractor.
///
/// `version` is an exact pin, `version_spec` a range or spec string. Both
/// absent is the valid "unspecified" state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDependency {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub version_spec: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub ecosystem: Option<String>,
}

impl ProjectDependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_version_spec(mut self, spec: impl Into<String>) -> Self {
        self.version_spec = Some(spec.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_ecosystem(mut self, ecosystem: impl Into<String>) -> Self {
        self.ecosystem = Some(ecosystem.into());
        self
    }
}

/// Project descriptor yielded by the project detector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    /// Directory the project is rooted at, relative to the repository root.
    #[serde(default)]
    pub root_path: Option<String>,
}

/// A technology detected somewhere in the repository.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyDetection {
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Where the detection came from (manifest path, file pattern, ...).
    #[serde(default)]
    pub source: String,
}

/// Output of the project detector.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    #[serde(default)]
    pub projects: Vec<ProjectDescriptor>,
    #[serde(default)]
    pub technologies: Vec<TechnologyDetection>,
}

// ============================================================================
// Metrics
// ============================================================================

/// File, size and line totals over a collection of file nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_files: u64,
    pub text_files: u64,
    pub binary_files: u64,
    pub total_size_bytes: u64,
    pub total_text_size_bytes: u64,
    pub total_lines_of_code: u64,
}

impl Metrics {
    /// `totalFiles = textFiles + binaryFiles` and text size never exceeds total size.
    pub fn is_conserved(&self) -> bool {
        self.total_files == self.text_files + self.binary_files
            && self.total_size_bytes >= self.total_text_size_bytes
    }
}

/// Project metrics: the shared totals plus a per-language breakdown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetrics {
    #[serde(flatten)]
    pub totals: Metrics,
    pub languages: Vec<LanguageBreakdown>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageBreakdown {
    pub language: String,
    pub file_count: u64,
    pub lines_of_code: u64,
}

// ============================================================================
// Dependency summaries
// ============================================================================

/// Scope buckets, version states, density and ecosystem counts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySummary {
    pub total_dependencies: u64,
    pub prod: u64,
    pub dev: u64,
    pub test: u64,
    pub peer: u64,
    pub optional: u64,
    pub other: u64,
    pub exact_version_count: u64,
    pub version_spec_count: u64,
    pub unspecified_version_count: u64,
    #[serde(rename = "dependenciesPerKLoc")]
    pub dependencies_per_kloc: Option<f64>,
    pub ecosystems: Vec<EcosystemCount>,
}

impl DependencySummary {
    /// Sum of the six scope buckets.
    pub fn scope_total(&self) -> u64 {
        self.prod + self.dev + self.test + self.peer + self.optional + self.other
    }

    /// Sum of the three version states.
    pub fn version_state_total(&self) -> u64 {
        self.exact_version_count + self.version_spec_count + self.unspecified_version_count
    }
}

/// Repository-level summary: project sums plus a ranking of projects.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDependencySummary {
    #[serde(flatten)]
    pub summary: DependencySummary,
    pub projects_by_dependency_count: Vec<ProjectDependencyRank>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemCount {
    /// Ecosystem name; blank or absent ecosystems share the `""` bucket.
    pub ecosystem: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDependencyRank {
    pub project_id: String,
    pub project_name: String,
    pub dependency_count: u64,
}

// ============================================================================
// Signals
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStructuralSignals {
    pub is_polyglot_repository: bool,
    pub distinct_project_type_count: u64,
    pub distinct_language_count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStructuralSignals {
    pub is_legacy_dot_net_framework: bool,
    pub is_modern_dot_net: bool,
    pub uses_version_ranges: bool,
    pub has_no_dependencies: bool,
    pub has_high_dependency_density: bool,
    pub is_large_project: bool,
    pub is_mixed_language: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryArchitectureSignals {
    pub has_containerization: bool,
    pub has_ci: bool,
    pub has_infrastructure_layer: bool,
    pub projects_with_tests_count: u64,
    pub api_project_count: u64,
    pub library_project_count: u64,
    pub test_frameworks: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectArchitectureSignals {
    pub has_tests: bool,
    pub test_file_count: u64,
    pub test_to_source_ratio: Option<f64>,
    pub test_frameworks: Vec<String>,
    pub has_containerization: bool,
    pub has_ci: bool,
    pub has_infrastructure_code: bool,
    pub is_api_project: bool,
    /// Always `!is_api_project`.
    pub is_library_project: bool,
}

/// Per-project modernization record produced by an external builder.
///
/// The core only reads the three ordering keys; everything else the builder
/// wants to report goes into `attributes` untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModernizationSignals {
    pub project_id: String,
    pub framework_identifier: Option<String>,
    pub runtime_platform: Option<String>,
    pub runtime_generation: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryModernizationSignals {
    /// Ordered by framework identifier, runtime platform, runtime generation.
    pub projects: Vec<ModernizationSignals>,
    pub runtime_platforms: Vec<String>,
}
