//! Rule tables driving language detection and signal derivation.
//!
//! `AnalysisRules` is plain immutable data handed to the graph builder.
//! There is no process-wide registry: tests and callers substitute their
//! own tables, and concurrent assessments never share mutable state.
//!
//! Rules can be overridden from TOML; every field falls back to the
//! built-in table when omitted.
//!
//! ```toml
//! high_dependency_density_threshold = 8.0
//! large_project_line_threshold = 10000
//! web_framework_markers = ["aspnetcore", "express"]
//!
//! [languages]
//! cshtml = "razor"
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::ordering::starts_with_ignore_case;

/// Dependency count per 1000 lines above which density is "high".
pub const DEFAULT_HIGH_DENSITY_THRESHOLD: f64 = 5.0;

/// Line count at or above which a project is "large".
pub const DEFAULT_LARGE_PROJECT_LINES: u64 = 5000;

const LANGUAGES: &[(&str, &str)] = &[
    ("py", "python"),
    ("pyw", "python"),
    ("pyi", "python"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("cs", "csharp"),
    ("vb", "visualbasic"),
    ("fs", "fsharp"),
    ("go", "go"),
    ("rs", "rust"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("scala", "scala"),
    ("rb", "ruby"),
    ("php", "php"),
    ("swift", "swift"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("hpp", "cpp"),
    ("cc", "cpp"),
    ("sql", "sql"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("ps1", "powershell"),
    ("tf", "terraform"),
    ("bicep", "bicep"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "scss"),
];

const LEGACY_RUNTIME_PREFIXES: &[&str] =
    &["net2", "net3", "net4", "v2.", "v3.", "v4.", "netframework"];

const MODERN_RUNTIME_PREFIXES: &[&str] = &[
    "net5", "net6", "net7", "net8", "net9", "net10", "net11",
];

const TEST_DIRECTORY_MARKERS: &[&str] = &["/test", "/tests", ".tests/", ".test/", "__tests__"];

const TEST_FILE_SUFFIXES: &[&str] = &[
    "test.cs",
    "tests.cs",
    ".test.js",
    ".spec.js",
    ".test.jsx",
    ".spec.jsx",
    ".test.ts",
    ".spec.ts",
    ".test.tsx",
    ".spec.tsx",
    "_test.go",
    "_test.py",
    "test.java",
    "tests.java",
    "test.kt",
    "_spec.rb",
    "_test.rb",
    "test.php",
];

const TEST_FRAMEWORKS: &[&str] = &[
    "xunit",
    "nunit",
    "mstest",
    "junit",
    "testng",
    "pytest",
    "jest",
    "mocha",
    "jasmine",
    "vitest",
    "rspec",
    "minitest",
    "phpunit",
    "cypress",
    "playwright",
];

const CONTAINER_FILE_SUFFIXES: &[&str] = &["dockerfile"];

const CONTAINER_FILE_PREFIXES: &[&str] = &["docker-compose", "compose.y"];

const CI_PATH_MARKERS: &[&str] = &[
    ".github/workflows/",
    ".gitlab-ci.yml",
    "azure-pipelines",
    ".circleci/",
    "jenkinsfile",
    "bitbucket-pipelines.yml",
    ".travis.yml",
];

const INFRASTRUCTURE_EXTENSIONS: &[&str] = &["tf", "bicep"];

const CLOUD_TEMPLATE_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Matched against the lowercased path with a leading `/`; `/template.y`
/// is the SAM default file name.
const CLOUD_TEMPLATE_MARKERS: &[&str] =
    &["cloudformation", "cfn", "-template.", ".template.", "/template.y"];

const WEB_FRAMEWORK_MARKERS: &[&str] = &[
    "aspnetcore",
    "system.web.mvc",
    "system.web.http",
    "express",
    "fastify",
    "koa",
    "@nestjs/core",
    "flask",
    "django",
    "fastapi",
    "spring-boot-starter-web",
    "spring-webmvc",
    "gin-gonic/gin",
    "labstack/echo",
    "gofiber/fiber",
    "actix-web",
    "axum",
    "rocket",
    "sinatra",
    "rails",
    "laravel/framework",
];

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Immutable rule set passed into the graph builder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRules {
    /// Lowercased extension (no dot) to language identifier. Overrides are
    /// merged over the built-in table; an empty language removes an entry.
    #[serde(deserialize_with = "merge_languages")]
    pub languages: BTreeMap<String, String>,
    pub legacy_runtime_prefixes: Vec<String>,
    pub modern_runtime_prefixes: Vec<String>,
    pub test_directory_markers: Vec<String>,
    pub test_file_suffixes: Vec<String>,
    pub test_frameworks: Vec<String>,
    pub container_file_suffixes: Vec<String>,
    pub container_file_prefixes: Vec<String>,
    pub ci_path_markers: Vec<String>,
    pub infrastructure_extensions: Vec<String>,
    pub cloud_template_extensions: Vec<String>,
    pub cloud_template_markers: Vec<String>,
    pub web_framework_markers: Vec<String>,
    pub high_dependency_density_threshold: f64,
    pub large_project_line_threshold: u64,
}

fn default_languages() -> BTreeMap<String, String> {
    LANGUAGES
        .iter()
        .map(|(ext, lang)| (ext.to_string(), lang.to_string()))
        .collect()
}

fn merge_languages<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<String, String>::deserialize(deserializer)?;
    let mut languages = default_languages();
    for (extension, language) in overrides {
        let extension = normalize_extension(&extension);
        let language = language.trim();
        if language.is_empty() {
            languages.remove(&extension);
        } else {
            languages.insert(extension, language.to_string());
        }
    }
    Ok(languages)
}

impl Default for AnalysisRules {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            legacy_runtime_prefixes: owned(LEGACY_RUNTIME_PREFIXES),
            modern_runtime_prefixes: owned(MODERN_RUNTIME_PREFIXES),
            test_directory_markers: owned(TEST_DIRECTORY_MARKERS),
            test_file_suffixes: owned(TEST_FILE_SUFFIXES),
            test_frameworks: owned(TEST_FRAMEWORKS),
            container_file_suffixes: owned(CONTAINER_FILE_SUFFIXES),
            container_file_prefixes: owned(CONTAINER_FILE_PREFIXES),
            ci_path_markers: owned(CI_PATH_MARKERS),
            infrastructure_extensions: owned(INFRASTRUCTURE_EXTENSIONS),
            cloud_template_extensions: owned(CLOUD_TEMPLATE_EXTENSIONS),
            cloud_template_markers: owned(CLOUD_TEMPLATE_MARKERS),
            web_framework_markers: owned(WEB_FRAMEWORK_MARKERS),
            high_dependency_density_threshold: DEFAULT_HIGH_DENSITY_THRESHOLD,
            large_project_line_threshold: DEFAULT_LARGE_PROJECT_LINES,
        }
    }
}

impl AnalysisRules {
    /// Parse rule overrides from TOML. Omitted fields keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Language for an extension, with or without a leading dot.
    pub fn language_for_extension(&self, extension: &str) -> Option<&str> {
        let ext = normalize_extension(extension);
        if ext.is_empty() {
            return None;
        }
        self.languages.get(&ext).map(String::as_str)
    }

    pub fn is_legacy_runtime(&self, framework: &str) -> bool {
        matches_prefix(framework, &self.legacy_runtime_prefixes)
    }

    pub fn is_modern_runtime(&self, framework: &str) -> bool {
        matches_prefix(framework, &self.modern_runtime_prefixes)
    }
}

/// Lowercase an extension and strip any leading dot.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

fn matches_prefix(value: &str, prefixes: &[String]) -> bool {
    let value = value.trim();
    prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .any(|p| starts_with_ignore_case(value, p))
}
