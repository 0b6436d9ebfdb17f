//! End-to-end tests for the assessment pipeline.
//!
//! Drives `RepositoryGraphBuilder` through the public API with in-memory
//! scan results and a project catalog standing in for detection.

use chrono::{TimeZone, Utc};
use std::path::Path;

use repograph_core::{
    compute_repository_hash, AnalysisRules, Error, FileScanner, FsScanner, ProjectCatalog,
    ProjectDependency, ProjectDescriptor, RepositoryGraph, RepositoryGraphBuilder,
    RuntimeModernizationBuilder, ScanError, ScannedFile, StaticFiles,
};

// ============================================================================
// Test Utilities
// ============================================================================

fn project(id: &str, root: &str, framework: Option<&str>, project_type: &str) -> ProjectDescriptor {
    ProjectDescriptor {
        id: id.to_string(),
        name: id.to_string(),
        framework: framework.map(str::to_string),
        project_type: Some(project_type.to_string()),
        root_path: Some(root.to_string()),
    }
}

fn builder(files: Vec<ScannedFile>, catalog: ProjectCatalog) -> RepositoryGraphBuilder {
    RepositoryGraphBuilder::new()
        .scanner(StaticFiles(files))
        .catalog(catalog)
        .modernization(RuntimeModernizationBuilder::default())
}

/// Build with a fixed timestamp so whole graphs can be compared.
fn build(files: Vec<ScannedFile>, catalog: ProjectCatalog) -> RepositoryGraph {
    let builder = builder(files, catalog);
    let prepared = builder.prepare(Path::new("/repo"), "sample").unwrap();
    builder.complete(prepared, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
}

fn assess(files: Vec<ScannedFile>, catalog: ProjectCatalog) -> RepositoryGraph {
    builder(files, catalog)
        .build(Path::new("/repo"), "sample")
        .unwrap()
}

fn sample_files() -> Vec<ScannedFile> {
    vec![
        ScannedFile::text("src/App/Program.cs", 4000, "a1", 600),
        ScannedFile::text("src/App/Service.cs", 2000, "a2", 300),
        ScannedFile::text("src/App.Tests/ServiceTests.cs", 800, "a3", 100),
        ScannedFile::binary("src/App/logo.png", 5000, "a4"),
        ScannedFile::text("README.md", 120, "a5", 12),
    ]
}

// ============================================================================
// Hash
// ============================================================================

#[test]
fn test_hash_is_order_independent() {
    let files = sample_files();
    let mut reversed = files.clone();
    reversed.reverse();

    let a = assess(files, ProjectCatalog::default());
    let b = assess(reversed, ProjectCatalog::default());

    assert_eq!(a.metadata.repository_hash, b.metadata.repository_hash);
    assert_eq!(a.files, b.files);
}

#[test]
fn test_hash_sensitivity() {
    let base = assess(sample_files(), ProjectCatalog::default()).metadata.repository_hash;

    let mut digest_changed = sample_files();
    digest_changed[0].content_hash = "zz".to_string();
    let mut size_changed = sample_files();
    size_changed[0].size_bytes += 1;
    let mut path_changed = sample_files();
    path_changed[0].path = "src/App/Main.cs".to_string();
    let mut removed = sample_files();
    removed.pop();
    let mut added = sample_files();
    added.push(ScannedFile::text("LICENSE", 10, "a6", 1));

    for variant in [digest_changed, size_changed, path_changed, removed, added] {
        let hash = assess(variant, ProjectCatalog::default()).metadata.repository_hash;
        assert_ne!(hash, base);
    }
}

#[test]
fn test_hash_matches_file_nodes() {
    let graph = assess(sample_files(), ProjectCatalog::default());
    assert_eq!(graph.metadata.repository_hash, compute_repository_hash(&graph.files));
    assert_eq!(graph.metadata.repository_hash.len(), 64);
}

// ============================================================================
// Metrics and linking
// ============================================================================

#[test]
fn test_metrics_conservation() {
    let catalog = ProjectCatalog::default()
        .with_project(project("app", "src/App", Some("net8.0"), "web"), vec![])
        .with_project(project("app-tests", "src/App.Tests", Some("net8.0"), "test"), vec![]);
    let graph = assess(sample_files(), catalog);

    assert!(graph.metrics.is_conserved());
    assert_eq!(graph.metrics.total_files, 5);
    assert_eq!(graph.metrics.binary_files, 1);
    assert_eq!(graph.metrics.total_size_bytes, 11920);
    assert_eq!(graph.metrics.total_text_size_bytes, 6920);
    assert_eq!(graph.metrics.total_lines_of_code, 1012);

    for project in &graph.projects {
        assert!(project.metrics.totals.is_conserved());
    }
}

#[test]
fn test_unassigned_files_stay_in_repository_totals() {
    let catalog = ProjectCatalog::default()
        .with_project(project("app", "src/App", None, "web"), vec![]);
    let graph = assess(sample_files(), catalog);

    let readme = graph.file("README.md").unwrap();
    assert!(readme.project_id.is_none());
    let tests = graph.file("src/App.Tests/ServiceTests.cs").unwrap();
    assert!(tests.project_id.is_none());

    let app = graph.project("app").unwrap();
    assert_eq!(app.metrics.totals.total_files, 3);
    assert_eq!(app.metrics.totals.total_lines_of_code, 900);
    assert_eq!(graph.metrics.total_files, 5);
    assert_eq!(graph.metrics.total_lines_of_code, 1012);

    let project_sum: u64 = graph.projects.iter().map(|p| p.metrics.totals.total_files).sum();
    assert!(project_sum <= graph.metrics.total_files);
}

#[test]
fn test_every_project_id_refers_to_a_project() {
    let catalog = ProjectCatalog::default()
        .with_project(project("app", "src/App", None, "web"), vec![])
        .with_project(project("root", "", None, "solution"), vec![]);
    let graph = assess(sample_files(), catalog);

    for file in &graph.files {
        let id = file.project_id.as_deref().unwrap();
        assert!(graph.project(id).is_some());
    }
    assert_eq!(graph.file("README.md").unwrap().project_id.as_deref(), Some("root"));
}

#[test]
fn test_empty_project_zero_metrics() {
    let catalog = ProjectCatalog::default()
        .with_project(project("ghost", "nowhere", None, "library"), vec![]);
    let graph = assess(sample_files(), catalog);
    let ghost = graph.project("ghost").unwrap();

    assert_eq!(ghost.metrics.totals.total_files, 0);
    assert_eq!(ghost.metrics.totals.total_lines_of_code, 0);
    assert!(ghost.metrics.languages.is_empty());
    assert_eq!(ghost.dependency_summary.dependencies_per_kloc, None);
    assert!(ghost.structural_signals.has_no_dependencies);
    assert_eq!(ghost.architecture_signals.test_to_source_ratio, None);
    assert!(!ghost.architecture_signals.has_tests);
}

// ============================================================================
// Dependencies and signals
// ============================================================================

#[test]
fn test_end_to_end_single_project() {
    let files = vec![
        ScannedFile::text("src/App/Program.cs", 4000, "b1", 700),
        ScannedFile::text("src/App/Service.cs", 2000, "b2", 300),
    ];
    let catalog = ProjectCatalog::default().with_project(
        project("app", "src/App", Some("net8.0"), "library"),
        vec![
            ProjectDependency::new("xunit").with_scope(""),
            ProjectDependency::new("serilog").with_scope("dev"),
        ],
    );
    let graph = assess(files, catalog);
    let app = graph.project("app").unwrap();

    assert_eq!(app.metrics.totals.total_lines_of_code, 1000);
    let summary = &app.dependency_summary;
    assert_eq!(summary.total_dependencies, 2);
    assert_eq!(summary.prod, 1);
    assert_eq!(summary.dev, 1);
    assert_eq!(summary.dependencies_per_kloc, Some(2.0));
    assert!(app.architecture_signals.has_tests);
    assert_eq!(app.architecture_signals.test_frameworks, vec!["xunit"]);
    assert!(app.structural_signals.is_modern_dot_net);
}

#[test]
fn test_dependency_bucket_conservation() {
    let deps_a = vec![
        ProjectDependency::new("a").with_scope("runtime").with_version("1.0"),
        ProjectDependency::new("b").with_scope("test").with_version_spec("^2"),
        ProjectDependency::new("c").with_scope("peer"),
        ProjectDependency::new("d").with_scope("optional"),
        ProjectDependency::new("e").with_scope("provided"),
    ];
    let deps_b = vec![ProjectDependency::new("f"), ProjectDependency::new("g").with_scope("Dev")];
    let catalog = ProjectCatalog::default()
        .with_project(project("a", "src/App", None, "web"), deps_a)
        .with_project(project("b", "src/App.Tests", None, "test"), deps_b);
    let graph = assess(sample_files(), catalog);

    for project in &graph.projects {
        let s = &project.dependency_summary;
        assert_eq!(s.scope_total(), s.total_dependencies);
        assert_eq!(s.version_state_total(), s.total_dependencies);
    }
    let repo = &graph.dependency_summary.summary;
    assert_eq!(repo.total_dependencies, 7);
    assert_eq!(repo.scope_total(), 7);
    assert_eq!(repo.version_state_total(), 7);
    assert_eq!(repo.prod, 2);
    assert_eq!(repo.dev, 1);
    assert_eq!(repo.other, 1);

    let ranked: Vec<&str> = graph
        .dependency_summary
        .projects_by_dependency_count
        .iter()
        .map(|r| r.project_id.as_str())
        .collect();
    assert_eq!(ranked, vec!["a", "b"]);
}

#[test]
fn test_density_threshold_boundary() {
    let files = vec![ScannedFile::text("lib/Core.cs", 100, "c1", 2000)];
    let ten: Vec<ProjectDependency> = (0..10).map(|i| ProjectDependency::new(format!("dep{}", i))).collect();
    let catalog = ProjectCatalog::default().with_project(project("core", "lib", None, "library"), ten);
    let graph = assess(files, catalog);
    let core = graph.project("core").unwrap();

    assert_eq!(core.dependency_summary.dependencies_per_kloc, Some(5.0));
    assert!(!core.structural_signals.has_high_dependency_density);

    let rules = AnalysisRules {
        high_dependency_density_threshold: 4.99,
        ..AnalysisRules::default()
    };
    let files = vec![ScannedFile::text("lib/Core.cs", 100, "c1", 2000)];
    let ten: Vec<ProjectDependency> = (0..10).map(|i| ProjectDependency::new(format!("dep{}", i))).collect();
    let graph = RepositoryGraphBuilder::new()
        .with_rules(rules)
        .scanner(StaticFiles(files))
        .catalog(ProjectCatalog::default().with_project(project("core", "lib", None, "library"), ten))
        .build(Path::new("/repo"), "sample")
        .unwrap();
    assert!(graph.project("core").unwrap().structural_signals.has_high_dependency_density);
}

#[test]
fn test_polyglot_by_languages_with_single_project_type() {
    let files = vec![
        ScannedFile::text("svc/api.cs", 10, "d1", 5),
        ScannedFile::text("svc/tool.py", 10, "d2", 5),
    ];
    let catalog = ProjectCatalog::default().with_project(project("svc", "svc", None, "web"), vec![]);
    let graph = assess(files, catalog);

    assert_eq!(graph.structural_signals.distinct_project_type_count, 1);
    assert_eq!(graph.structural_signals.distinct_language_count, 2);
    assert!(graph.structural_signals.is_polyglot_repository);
    assert!(graph.project("svc").unwrap().structural_signals.is_mixed_language);
}

#[test]
fn test_legacy_and_modern_runtimes() {
    let files = vec![
        ScannedFile::text("old/Legacy.cs", 10, "e1", 5),
        ScannedFile::text("new/Modern.cs", 10, "e2", 5),
    ];
    let catalog = ProjectCatalog::default()
        .with_project(project("old", "old", Some("net48"), "library"), vec![])
        .with_project(project("new", "new", Some("net8.0"), "library"), vec![]);
    let graph = assess(files, catalog);

    let old = graph.project("old").unwrap();
    assert!(old.structural_signals.is_legacy_dot_net_framework);
    assert!(!old.structural_signals.is_modern_dot_net);
    let new = graph.project("new").unwrap();
    assert!(new.structural_signals.is_modern_dot_net);
    assert!(!new.structural_signals.is_legacy_dot_net_framework);

    let modernization = &graph.modernization_signals;
    let order: Vec<&str> = modernization.projects.iter().map(|r| r.project_id.as_str()).collect();
    assert_eq!(order, vec!["old", "new"]);
    assert_eq!(modernization.runtime_platforms, vec!["dotnet", "dotnet-framework"]);
    assert_eq!(
        old.modernization_signals.as_ref().unwrap().runtime_generation.as_deref(),
        Some("4.8")
    );
}

#[test]
fn test_architecture_rollup() {
    let files = vec![
        ScannedFile::text("api/Program.cs", 10, "f1", 10),
        ScannedFile::text("api/Dockerfile", 10, "f2", 10),
        ScannedFile::text("api/.github/workflows/ci.yml", 10, "f3", 10),
        ScannedFile::text("lib/Core.cs", 10, "f4", 10),
        ScannedFile::text("lib/tests/CoreTests.cs", 10, "f5", 10),
        ScannedFile::text("lib/infra/main.tf", 10, "f6", 10),
    ];
    let catalog = ProjectCatalog::default()
        .with_project(
            project("api", "api", Some("net8.0"), "web"),
            vec![ProjectDependency::new("Microsoft.AspNetCore.App")],
        )
        .with_project(
            project("lib", "lib", Some("net8.0"), "library"),
            vec![ProjectDependency::new("NUnit").with_scope("test")],
        );
    let graph = assess(files, catalog);

    let api = &graph.project("api").unwrap().architecture_signals;
    assert!(api.is_api_project);
    assert!(api.has_containerization);
    assert!(api.has_ci);
    assert!(!api.has_tests);

    let lib = &graph.project("lib").unwrap().architecture_signals;
    assert!(lib.is_library_project);
    assert!(lib.has_tests);
    assert_eq!(lib.test_file_count, 1);
    assert_eq!(lib.test_to_source_ratio, Some(0.5));
    assert!(lib.has_infrastructure_code);

    let repo = &graph.architecture_signals;
    assert!(repo.has_containerization);
    assert!(repo.has_ci);
    assert!(repo.has_infrastructure_layer);
    assert_eq!(repo.projects_with_tests_count, 1);
    assert_eq!(repo.api_project_count, 1);
    assert_eq!(repo.library_project_count, 1);
    assert_eq!(repo.test_frameworks, vec!["nunit"]);
}

// ============================================================================
// Determinism, errors, serialization
// ============================================================================

#[test]
fn test_same_input_same_output() {
    let catalog = || {
        ProjectCatalog::default().with_project(
            project("app", "src/App", Some("net48"), "web"),
            vec![
                ProjectDependency::new("Serilog").with_ecosystem("NuGet"),
                ProjectDependency::new("Dapper").with_ecosystem("nuget"),
            ],
        )
    };
    let mut shuffled = sample_files();
    shuffled.rotate_left(2);

    let a = serde_json::to_string(&build(sample_files(), catalog())).unwrap();
    let b = serde_json::to_string(&build(shuffled, catalog())).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_error_kinds_are_distinct() {
    let invalid = RepositoryGraphBuilder::new()
        .scanner(StaticFiles::default())
        .build(Path::new(""), "sample")
        .unwrap_err();
    assert!(matches!(invalid, Error::InvalidInput(_)));
    assert!(!invalid.is_configuration());

    let missing = RepositoryGraphBuilder::new()
        .build(Path::new("/repo"), "sample")
        .unwrap_err();
    assert!(matches!(missing, Error::MissingCollaborator(_)));
    assert!(missing.is_configuration());
}

#[test]
fn test_scanner_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let err = RepositoryGraphBuilder::new()
        .scanner(FsScanner::new())
        .build(&missing, "sample")
        .unwrap_err();
    assert!(matches!(err, Error::Scan(ScanError::RootNotFound(_))));
}

#[test]
fn test_filesystem_scan_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("src/App")).unwrap();
    std::fs::write(root.join("src/App/Program.cs"), "class P {}\n// one\n").unwrap();
    std::fs::write(root.join("README.md"), "# sample\n").unwrap();

    let scanned = FsScanner::new().scan(root).unwrap();
    assert_eq!(scanned.len(), 2);

    let catalog = ProjectCatalog::default()
        .with_project(project("app", "src/App", Some("net8.0"), "library"), vec![]);
    let graph = RepositoryGraphBuilder::new()
        .scanner(FsScanner::new())
        .catalog(catalog)
        .build(root, "sample")
        .unwrap();

    assert_eq!(graph.metrics.total_files, 2);
    assert_eq!(graph.metrics.total_lines_of_code, 3);
    let app = graph.project("app").unwrap();
    assert_eq!(app.metrics.languages[0].language, "csharp");
    assert_eq!(app.metrics.totals.total_lines_of_code, 2);
}

#[test]
fn test_graph_json_field_names() {
    let catalog = ProjectCatalog::default()
        .with_project(project("app", "src/App", Some("net8.0"), "web"), vec![]);
    let json = serde_json::to_value(build(sample_files(), catalog)).unwrap();

    for key in [
        "metadata",
        "files",
        "projects",
        "technologies",
        "metrics",
        "dependencySummary",
        "structuralSignals",
        "architectureSignals",
        "modernizationSignals",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert!(json["metadata"]["repositoryHash"].is_string());
    assert_eq!(json["metadata"]["assessedAt"], "2026-01-01T00:00:00Z");
    assert!(json["projects"][0]["metrics"]["totalLinesOfCode"].is_number());
    assert!(json["projects"][0]["metrics"]["languages"].is_array());
}
