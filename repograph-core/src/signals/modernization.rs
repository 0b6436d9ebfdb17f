//! Modernization signals.
//!
//! Per-project records come from a [`ModernizationSignalBuilder`]; the core
//! only orders them and rolls up the runtime platforms.
//! [`RuntimeModernizationBuilder`] is the builder the CLI uses: it reads the
//! project's target framework moniker.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::collaborators::ModernizationSignalBuilder;
use crate::ordering::{cmp_ignore_case, cmp_option_ignore_case, eq_ignore_case, non_blank};
use crate::rules::AnalysisRules;
use crate::types::{ModernizationSignals, RepositoryModernizationSignals, RepositoryProjectNode};

pub const PLATFORM_FRAMEWORK: &str = "dotnet-framework";
pub const PLATFORM_MODERN: &str = "dotnet";
pub const PLATFORM_CORE: &str = "dotnet-core";
pub const PLATFORM_STANDARD: &str = "dotnet-standard";

/// Derives platform and generation from a framework moniker such as
/// `net48`, `net8.0`, `netcoreapp3.1` or `netstandard2.0`.
#[derive(Clone, Debug, Default)]
pub struct RuntimeModernizationBuilder {
    rules: AnalysisRules,
}

impl RuntimeModernizationBuilder {
    pub fn new(rules: AnalysisRules) -> Self {
        Self { rules }
    }

    pub fn runtime_platform(&self, moniker: &str) -> Option<&'static str> {
        let lowered = moniker.trim().to_lowercase();
        if lowered.starts_with("netcoreapp") {
            Some(PLATFORM_CORE)
        } else if lowered.starts_with("netstandard") {
            Some(PLATFORM_STANDARD)
        } else if self.rules.is_legacy_runtime(&lowered) {
            Some(PLATFORM_FRAMEWORK)
        } else if self.rules.is_modern_runtime(&lowered) {
            Some(PLATFORM_MODERN)
        } else {
            None
        }
    }
}

/// Numeric part of a moniker in dotted form.
///
/// Dotless legacy monikers spell one digit per component (`net472` is
/// 4.7.2); a lone major version gets a `.0`. Returns `None` when the moniker
/// carries no version.
pub fn runtime_generation(moniker: &str) -> Option<String> {
    let lowered = moniker.trim().to_lowercase();
    let rest = ["netcoreapp", "netstandard", "netframework", "net", "v"]
        .iter()
        .find_map(|prefix| lowered.strip_prefix(prefix))
        .unwrap_or(&lowered);

    let version: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let version = version.trim_matches('.');
    if version.is_empty() {
        return None;
    }

    if version.contains('.') {
        return Some(version.to_string());
    }
    if version.len() == 1 {
        return Some(format!("{}.0", version));
    }
    // Two-digit modern majors (`net10`) stay whole.
    if version.starts_with('1') && version.len() == 2 {
        return Some(format!("{}.0", version));
    }
    let dotted: Vec<String> = version.chars().map(String::from).collect();
    Some(dotted.join("."))
}

impl ModernizationSignalBuilder for RuntimeModernizationBuilder {
    fn build(&self, project: &RepositoryProjectNode) -> Option<ModernizationSignals> {
        let moniker = non_blank(project.framework.as_deref())?;

        let mut attributes = BTreeMap::new();
        attributes.insert(
            "isLegacy".to_string(),
            Value::Bool(self.rules.is_legacy_runtime(moniker)),
        );
        attributes.insert(
            "isModern".to_string(),
            Value::Bool(self.rules.is_modern_runtime(moniker)),
        );

        Some(ModernizationSignals {
            project_id: project.id.clone(),
            framework_identifier: Some(moniker.to_string()),
            runtime_platform: self.runtime_platform(moniker).map(str::to_string),
            runtime_generation: runtime_generation(moniker),
            attributes,
        })
    }
}

/// Order the per-project records and collect the distinct runtime platforms.
pub fn repository_signals(projects: &[RepositoryProjectNode]) -> RepositoryModernizationSignals {
    let mut records: Vec<ModernizationSignals> = projects
        .iter()
        .filter_map(|p| p.modernization_signals.clone())
        .collect();
    records.sort_by(|a, b| {
        cmp_option_ignore_case(a.framework_identifier.as_deref(), b.framework_identifier.as_deref())
            .then_with(|| {
                cmp_option_ignore_case(a.runtime_platform.as_deref(), b.runtime_platform.as_deref())
            })
            .then_with(|| {
                cmp_option_ignore_case(
                    a.runtime_generation.as_deref(),
                    b.runtime_generation.as_deref(),
                )
            })
            .then_with(|| cmp_ignore_case(&a.project_id, &b.project_id))
    });

    let mut runtime_platforms: Vec<String> = records
        .iter()
        .filter_map(|r| non_blank(r.runtime_platform.as_deref()))
        .map(str::to_string)
        .collect();
    runtime_platforms.sort_by(|a, b| cmp_ignore_case(a, b));
    runtime_platforms.dedup_by(|a, b| eq_ignore_case(a, b));

    RepositoryModernizationSignals {
        projects: records,
        runtime_platforms,
    }
}
