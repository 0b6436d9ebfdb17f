//! Assess command - Build the repository graph and report it
//!
//! Scans the directory, feeds a project catalog through the pipeline and
//! prints either the full assessment as JSON or summary tables.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use repograph_core::{
    AssessmentHistory, AssessmentRequest, InMemoryAssessmentHistory, ProjectCatalog,
    RepositoryAssessmentResult, RepositoryAssessor, RepositoryGraph, RuntimeModernizationBuilder,
};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use super::Workspace;
use crate::output::{format_ratio, resolve_format, yes_no, OutputConfig, OutputFormat, Outputter, TableOutput};

/// Options for `repograph assess`.
#[derive(Debug, Default)]
pub struct AssessOptions {
    pub path: String,
    pub catalog: Option<String>,
    pub name: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub rules: Option<String>,
    /// Hash of a previous assessment; a match skips the project stages.
    pub since: Option<String>,
    /// RFC 3339 timestamp stamped on the graph instead of the current time.
    pub assessed_at: Option<String>,
    pub compact: bool,
    pub strict: bool,
}

/// Assessment result plus run timing, rendered by `assess`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    #[serde(flatten)]
    pub result: RepositoryAssessmentResult,
    #[serde(skip)]
    pub duration_ms: u64,
}

impl Outputter for AssessmentReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let result = &self.result;
        let mut sections = Vec::new();

        let status = if result.is_unchanged {
            "Unchanged".yellow().bold()
        } else {
            "Assessed".green().bold()
        };
        sections.push(format!(
            "{} {} ({}ms)",
            status,
            result.repository_name.bold(),
            self.duration_ms
        ));

        let mut pairs = vec![("Hash", result.repository_hash.clone())];
        if let Some(branch) = &result.branch {
            pairs.push(("Branch", branch.clone()));
        }
        if let Some(commit) = &result.resolved_commit {
            pairs.push(("Commit", commit.clone()));
        }

        let Some(graph) = &result.graph else {
            if let Some(message) = &result.message {
                pairs.push(("Message", message.clone()));
            }
            sections.push(TableOutput::format_key_value(&pairs, config));
            return sections.join("\n");
        };

        pairs.extend(summary_pairs(graph));
        sections.push(TableOutput::format_key_value(&pairs, config));

        sections.push(format!("\n{}", "Projects".cyan().bold()));
        sections.push(project_table(graph, config));

        if !graph.modernization_signals.projects.is_empty() {
            sections.push(format!("\n{}", "Runtimes".cyan().bold()));
            sections.push(runtime_table(graph, config));
        }

        sections.join("\n")
    }
}

fn summary_pairs(graph: &RepositoryGraph) -> Vec<(&'static str, String)> {
    let metrics = &graph.metrics;
    let deps = &graph.dependency_summary.summary;
    let structural = &graph.structural_signals;
    let architecture = &graph.architecture_signals;

    vec![
        (
            "Files",
            format!(
                "{} ({} text, {} binary)",
                metrics.total_files, metrics.text_files, metrics.binary_files
            ),
        ),
        ("Lines of code", metrics.total_lines_of_code.to_string()),
        ("Size (bytes)", metrics.total_size_bytes.to_string()),
        ("Projects", graph.projects.len().to_string()),
        ("Dependencies", deps.total_dependencies.to_string()),
        ("Deps per KLoC", format_ratio(deps.dependencies_per_kloc)),
        ("Polyglot", yes_no(structural.is_polyglot_repository).to_string()),
        ("Languages", structural.distinct_language_count.to_string()),
        ("Containerized", yes_no(architecture.has_containerization).to_string()),
        ("CI", yes_no(architecture.has_ci).to_string()),
        ("Infrastructure", yes_no(architecture.has_infrastructure_layer).to_string()),
        (
            "Test frameworks",
            if architecture.test_frameworks.is_empty() {
                "-".to_string()
            } else {
                architecture.test_frameworks.join(", ")
            },
        ),
    ]
}

fn project_table(graph: &RepositoryGraph, config: &OutputConfig) -> String {
    let rows: Vec<Vec<String>> = graph
        .projects
        .iter()
        .map(|p| {
            let kind = if p.architecture_signals.is_api_project {
                "api"
            } else {
                "library"
            };
            vec![
                p.id.clone(),
                p.framework.clone().unwrap_or_else(|| "-".to_string()),
                kind.to_string(),
                p.metrics.totals.total_files.to_string(),
                p.metrics.totals.total_lines_of_code.to_string(),
                p.dependency_summary.total_dependencies.to_string(),
                format_ratio(p.dependency_summary.dependencies_per_kloc),
                yes_no(p.architecture_signals.has_tests).to_string(),
            ]
        })
        .collect();

    TableOutput::from_rows(
        &["Project", "Framework", "Kind", "Files", "LOC", "Deps", "Deps/KLoC", "Tests"],
        &rows,
        &[3, 4, 5, 6],
        config,
    )
}

fn runtime_table(graph: &RepositoryGraph, config: &OutputConfig) -> String {
    let rows: Vec<Vec<String>> = graph
        .modernization_signals
        .projects
        .iter()
        .map(|m| {
            vec![
                m.project_id.clone(),
                m.framework_identifier.clone().unwrap_or_else(|| "-".to_string()),
                m.runtime_platform.clone().unwrap_or_else(|| "-".to_string()),
                m.runtime_generation.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    TableOutput::from_rows(&["Project", "Framework", "Platform", "Generation"], &rows, &[], config)
}

/// Run the assess command.
pub fn run(options: AssessOptions, format: Option<OutputFormat>) -> Result<()> {
    let start = Instant::now();
    let workspace = Workspace::open(&options.path, options.name.as_deref(), options.strict)?;
    let rules = workspace.rules(options.rules.as_deref())?;

    let catalog = match &options.catalog {
        Some(path) => ProjectCatalog::load(Path::new(path))
            .with_context(|| format!("Failed to load project catalog {}", path))?,
        None => ProjectCatalog::default(),
    };

    let builder = workspace
        .builder(rules.clone())
        .catalog(catalog)
        .modernization(RuntimeModernizationBuilder::new(rules));

    let mut assessor = RepositoryAssessor::new(builder);
    if let Some(previous) = &options.since {
        let history = InMemoryAssessmentHistory::new();
        history.record(&workspace.name, previous);
        assessor = assessor.with_history(history);
    }

    let mut request = AssessmentRequest::new(&workspace.root, &workspace.name);
    request.branch = options.branch;
    request.resolved_commit = options.commit;
    if let Some(at) = &options.assessed_at {
        let at = DateTime::parse_from_rfc3339(at)
            .with_context(|| format!("Invalid --assessed-at timestamp: {}", at))?;
        request = request.assessed_at(at.with_timezone(&Utc));
    }

    let result = assessor
        .assess(&request)
        .with_context(|| format!("Failed to assess {}", workspace.root.display()))?;

    let report = AssessmentReport {
        result,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    let format = resolve_format(format, workspace.config.default_format());
    let config = OutputConfig::auto_detect(format, workspace.config.use_color()).compact(options.compact);
    if !config.use_colors() {
        colored::control::set_override(false);
    }
    report.output(&config);
    Ok(())
}
