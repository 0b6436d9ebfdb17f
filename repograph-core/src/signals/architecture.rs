//! Architecture signals: tests, CI, containers, infrastructure code and the
//! API-versus-library split.

use std::collections::BTreeSet;

use crate::ordering::{cmp_ignore_case, eq_ignore_case};
use crate::rules::{normalize_extension, AnalysisRules};
use crate::types::{
    ProjectArchitectureSignals, ProjectDependency, RepositoryArchitectureSignals,
    RepositoryFileNode, RepositoryProjectNode,
};

/// Lowercased, `/`-separated path with a leading `/` so root-level
/// directories match the same markers as nested ones.
fn match_path(path: &str) -> String {
    let lowered = path.to_lowercase().replace('\\', "/");
    if lowered.starts_with('/') {
        lowered
    } else {
        format!("/{}", lowered)
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .filter(|n| !n.is_empty())
        .any(|n| haystack.contains(&n.to_lowercase()))
}

fn ends_with_any(haystack: &str, suffixes: &[String]) -> bool {
    suffixes
        .iter()
        .filter(|s| !s.is_empty())
        .any(|s| haystack.ends_with(&s.to_lowercase()))
}

fn extension_in(file: &RepositoryFileNode, extensions: &[String]) -> bool {
    let ext = normalize_extension(&file.extension);
    !ext.is_empty() && extensions.iter().any(|e| normalize_extension(e) == ext)
}

/// `name` ends with `suffix` ignoring case. A suffix that starts with a
/// letter must also start a word: at the start of the name, after a
/// non-alphanumeric char, or on an uppercase letter (`OrderTests.cs`), so
/// `Latest.cs` is not a test file.
fn ends_with_word(name: &str, suffix: &str) -> bool {
    if suffix.len() > name.len() {
        return false;
    }
    let split = name.len() - suffix.len();
    if !name.is_char_boundary(split) || !eq_ignore_case(&name[split..], suffix) {
        return false;
    }
    let Some(first) = suffix.chars().next() else {
        return false;
    };
    if !first.is_alphanumeric() {
        return true;
    }
    let starts_upper = name[split..].chars().next().is_some_and(char::is_uppercase);
    match name[..split].chars().next_back() {
        None => true,
        Some(prev) => !prev.is_alphanumeric() || starts_upper,
    }
}

pub fn is_test_file(file: &RepositoryFileNode, rules: &AnalysisRules) -> bool {
    let unified = file.path.replace('\\', "/");
    let name = file_name(&unified);
    contains_any(&match_path(&file.path), &rules.test_directory_markers)
        || rules
            .test_file_suffixes
            .iter()
            .filter(|s| !s.is_empty())
            .any(|s| ends_with_word(name, s))
}

pub fn is_container_file(file: &RepositoryFileNode, rules: &AnalysisRules) -> bool {
    let path = match_path(&file.path);
    let name = file_name(&path);
    ends_with_any(&path, &rules.container_file_suffixes)
        || rules
            .container_file_prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| name.starts_with(&p.to_lowercase()))
}

pub fn is_ci_file(file: &RepositoryFileNode, rules: &AnalysisRules) -> bool {
    contains_any(&match_path(&file.path), &rules.ci_path_markers)
}

pub fn is_infrastructure_file(file: &RepositoryFileNode, rules: &AnalysisRules) -> bool {
    if extension_in(file, &rules.infrastructure_extensions) {
        return true;
    }
    extension_in(file, &rules.cloud_template_extensions)
        && contains_any(&match_path(&file.path), &rules.cloud_template_markers)
}

/// Known test frameworks whose marker appears in any dependency name.
/// Distinct, sorted ignoring case.
pub fn detect_test_frameworks(
    dependencies: &[ProjectDependency],
    rules: &AnalysisRules,
) -> Vec<String> {
    let names: Vec<String> = dependencies.iter().map(|d| d.name.to_lowercase()).collect();
    let mut found: Vec<String> = rules
        .test_frameworks
        .iter()
        .filter(|fw| !fw.trim().is_empty())
        .filter(|fw| {
            let marker = fw.to_lowercase();
            names.iter().any(|name| name.contains(&marker))
        })
        .cloned()
        .collect();
    sort_unique(&mut found);
    found
}

pub fn is_api_project(dependencies: &[ProjectDependency], rules: &AnalysisRules) -> bool {
    dependencies
        .iter()
        .any(|d| contains_any(&d.name.to_lowercase(), &rules.web_framework_markers))
}

fn sort_unique(values: &mut Vec<String>) {
    values.sort_by(|a, b| cmp_ignore_case(a, b));
    values.dedup_by(|a, b| eq_ignore_case(a, b));
}

/// Derive one project's architecture signals from its linked files and
/// dependencies.
pub fn project_signals(
    files: &[&RepositoryFileNode],
    dependencies: &[ProjectDependency],
    rules: &AnalysisRules,
) -> ProjectArchitectureSignals {
    let test_file_count = files.iter().filter(|f| is_test_file(f, rules)).count() as u64;
    let source_file_count = files.len() as u64 - test_file_count;
    let test_frameworks = detect_test_frameworks(dependencies, rules);
    let is_api = is_api_project(dependencies, rules);

    ProjectArchitectureSignals {
        has_tests: test_file_count > 0 || !test_frameworks.is_empty(),
        test_file_count,
        test_to_source_ratio: (!files.is_empty())
            .then(|| test_file_count as f64 / source_file_count.max(1) as f64),
        test_frameworks,
        has_containerization: files.iter().any(|f| is_container_file(f, rules)),
        has_ci: files.iter().any(|f| is_ci_file(f, rules)),
        has_infrastructure_code: files.iter().any(|f| is_infrastructure_file(f, rules)),
        is_api_project: is_api,
        is_library_project: !is_api,
    }
}

/// Roll project signals up: any-true booleans, summed counts, union of
/// test frameworks.
pub fn repository_signals(projects: &[RepositoryProjectNode]) -> RepositoryArchitectureSignals {
    let mut signals = RepositoryArchitectureSignals::default();
    let mut frameworks = BTreeSet::new();

    for project in projects {
        let a = &project.architecture_signals;
        signals.has_containerization |= a.has_containerization;
        signals.has_ci |= a.has_ci;
        signals.has_infrastructure_layer |= a.has_infrastructure_code;
        signals.projects_with_tests_count += u64::from(a.has_tests);
        signals.api_project_count += u64::from(a.is_api_project);
        signals.library_project_count += u64::from(a.is_library_project);
        frameworks.extend(a.test_frameworks.iter().cloned());
    }

    let mut frameworks: Vec<String> = frameworks.into_iter().collect();
    sort_unique(&mut frameworks);
    signals.test_frameworks = frameworks;
    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> RepositoryFileNode {
        RepositoryFileNode {
            path: path.to_string(),
            extension: crate::scanner::extension_of(path),
            ..Default::default()
        }
    }

    #[test]
    fn test_test_file_detection() {
        let rules = AnalysisRules::default();
        assert!(is_test_file(&file("src/Api.Tests/UnitTest1.cs"), &rules));
        assert!(is_test_file(&file("tests/test_app.py"), &rules));
        assert!(is_test_file(&file("web/src/__tests__/App.js"), &rules));
        assert!(is_test_file(&file("web/src/App.spec.ts"), &rules));
        assert!(is_test_file(&file("pkg/handler_test.go"), &rules));
        assert!(is_test_file(&file("src/OrderServiceTests.cs"), &rules));
        assert!(!is_test_file(&file("src/Program.cs"), &rules));
        assert!(!is_test_file(&file("web/src/App.tsx"), &rules));
    }

    #[test]
    fn test_file_suffix_needs_word_boundary() {
        let rules = AnalysisRules::default();
        assert!(!is_test_file(&file("src/Latest.cs"), &rules));
        assert!(!is_test_file(&file("src/security/Attest.java"), &rules));
        assert!(!is_test_file(&file("src/Contest.kt"), &rules));
        assert!(is_test_file(&file("src/Test.cs"), &rules));
        assert!(is_test_file(&file("src/order_test.php"), &rules));
        assert!(is_test_file(&file("src\\OrderTests.java"), &rules));
        assert!(is_test_file(&file("web/latest.spec.ts"), &rules));
    }

    #[test]
    fn test_sort_unique_folds_non_ascii() {
        let mut values = vec![
            "Ünit".to_string(),
            "xunit".to_string(),
            "ünit".to_string(),
            "XUnit".to_string(),
        ];
        sort_unique(&mut values);
        assert_eq!(values, vec!["XUnit".to_string(), "Ünit".to_string()]);
    }

    #[test]
    fn test_container_ci_and_infrastructure() {
        let rules = AnalysisRules::default();
        assert!(is_container_file(&file("Dockerfile"), &rules));
        assert!(is_container_file(&file("deploy/api.Dockerfile"), &rules));
        assert!(is_container_file(&file("docker-compose.override.yml"), &rules));
        assert!(!is_container_file(&file("docs/docker.md"), &rules));

        assert!(is_ci_file(&file(".github/workflows/build.yml"), &rules));
        assert!(is_ci_file(&file("azure-pipelines.yml"), &rules));
        assert!(is_ci_file(&file("Jenkinsfile"), &rules));
        assert!(!is_ci_file(&file("src/github.cs"), &rules));

        assert!(is_infrastructure_file(&file("infra/main.tf"), &rules));
        assert!(is_infrastructure_file(&file("infra/main.bicep"), &rules));
        assert!(is_infrastructure_file(&file("deploy/cloudformation/stack.yaml"), &rules));
        assert!(is_infrastructure_file(&file("template.yml"), &rules));
        assert!(is_infrastructure_file(&file("deploy/network-template.yaml"), &rules));
        assert!(is_infrastructure_file(&file("deploy/api.cfn.yml"), &rules));
        assert!(!is_infrastructure_file(&file("config/appsettings.yaml"), &rules));
        assert!(!is_infrastructure_file(&file(".github/ISSUE_TEMPLATE/bug_report.yml"), &rules));
        assert!(!is_infrastructure_file(&file(".github/PULL_REQUEST_TEMPLATE/default.yml"), &rules));
    }

    #[test]
    fn test_framework_detection_by_substring() {
        let rules = AnalysisRules::default();
        let deps = vec![
            ProjectDependency::new("xunit.runner.visualstudio"),
            ProjectDependency::new("xunit"),
            ProjectDependency::new("Moq"),
            ProjectDependency::new("NUnit3TestAdapter"),
        ];
        assert_eq!(detect_test_frameworks(&deps, &rules), vec!["nunit", "xunit"]);
    }

    #[test]
    fn test_api_versus_library() {
        let rules = AnalysisRules::default();
        let api = vec![ProjectDependency::new("Microsoft.AspNetCore.OpenApi")];
        let lib = vec![ProjectDependency::new("Newtonsoft.Json")];

        let signals = project_signals(&[], &api, &rules);
        assert!(signals.is_api_project);
        assert!(!signals.is_library_project);

        let signals = project_signals(&[], &lib, &rules);
        assert!(!signals.is_api_project);
        assert!(signals.is_library_project);
    }

    #[test]
    fn test_ratio_and_has_tests() {
        let rules = AnalysisRules::default();
        let files = vec![
            file("src/App/Program.cs"),
            file("src/App/Service.cs"),
            file("src/App/ServiceTests.cs"),
        ];
        let refs: Vec<&RepositoryFileNode> = files.iter().collect();
        let signals = project_signals(&refs, &[], &rules);
        assert!(signals.has_tests);
        assert_eq!(signals.test_file_count, 1);
        assert_eq!(signals.test_to_source_ratio, Some(0.5));

        // Only test files: denominator is clamped to one.
        let only_tests = vec![file("tests/a_test.py"), file("tests/b_test.py")];
        let refs: Vec<&RepositoryFileNode> = only_tests.iter().collect();
        assert_eq!(project_signals(&refs, &[], &rules).test_to_source_ratio, Some(2.0));

        // No files at all: no ratio, tests still inferred from frameworks.
        let signals = project_signals(&[], &[ProjectDependency::new("xunit")], &rules);
        assert_eq!(signals.test_to_source_ratio, None);
        assert!(signals.has_tests);
    }

    #[test]
    fn test_repository_rollup() {
        let mut api = RepositoryProjectNode::default();
        api.architecture_signals = ProjectArchitectureSignals {
            has_tests: true,
            test_frameworks: vec!["xunit".to_string()],
            has_containerization: true,
            is_api_project: true,
            ..Default::default()
        };
        let mut lib = RepositoryProjectNode::default();
        lib.architecture_signals = ProjectArchitectureSignals {
            has_tests: true,
            test_frameworks: vec!["nunit".to_string(), "xunit".to_string()],
            has_infrastructure_code: true,
            is_library_project: true,
            ..Default::default()
        };

        let signals = repository_signals(&[api, lib]);
        assert!(signals.has_containerization);
        assert!(!signals.has_ci);
        assert!(signals.has_infrastructure_layer);
        assert_eq!(signals.projects_with_tests_count, 2);
        assert_eq!(signals.api_project_count, 1);
        assert_eq!(signals.library_project_count, 1);
        assert_eq!(signals.test_frameworks, vec!["nunit", "xunit"]);
    }
}
