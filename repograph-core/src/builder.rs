//! Repository graph builder.
//!
//! Assessment runs in two halves. [`RepositoryGraphBuilder::prepare`] scans,
//! builds file nodes, aggregates repository metrics and computes the
//! repository hash. [`RepositoryGraphBuilder::complete`] runs every project
//! stage on top of that snapshot. Callers holding a previous hash can stop
//! between the two.
//!
//! Stages after `prepare` run strictly in order, each reading only finished
//! outputs of earlier ones:
//!
//! 1. detect projects and technologies
//! 2. link files to projects
//! 3. per-project metrics
//! 4. extract dependencies
//! 5. project dependency summaries
//! 6. repository dependency summary
//! 7. structural signals
//! 8. architecture signals
//! 9. modernization signals

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::collaborators::{
    DependencyExtractor, FileScanner, ModernizationSignalBuilder, NoProjects, ProjectDetector,
    ProjectLinker,
};
use crate::dependencies::{summarize_project, summarize_repository};
use crate::error::{Error, Result};
use crate::hash::compute_repository_hash;
use crate::linker::{link_files, PrefixProjectLinker};
use crate::metrics::{aggregate, project_metrics};
use crate::nodes::build_file_nodes;
use crate::ordering::{cmp_ignore_case, cmp_option_ignore_case};
use crate::rules::AnalysisRules;
use crate::scanner::ScannedFile;
use crate::signals::{architecture, modernization, structural};
use crate::types::{
    Metrics, ProjectDescriptor, RepositoryFileNode, RepositoryGraph, RepositoryMetadata,
    RepositoryProjectNode, TechnologyDetection,
};

/// Output of the scan half of an assessment.
#[derive(Clone, Debug)]
pub struct ScannedRepository {
    pub root_path: String,
    pub repository_name: String,
    /// Raw descriptors, handed to the project detector.
    pub scanned: Vec<ScannedFile>,
    /// Ordered, path-unique file nodes.
    pub files: Vec<RepositoryFileNode>,
    pub metrics: Metrics,
    pub repository_hash: String,
}

/// Builds a [`RepositoryGraph`] from a repository root and its collaborators.
///
/// Only the file scanner is mandatory. Without a detector the repository has
/// no projects; without a modernization builder no project carries a
/// modernization record.
#[derive(Clone)]
pub struct RepositoryGraphBuilder {
    rules: Arc<AnalysisRules>,
    scanner: Option<Arc<dyn FileScanner>>,
    detector: Arc<dyn ProjectDetector>,
    linker: Arc<dyn ProjectLinker>,
    extractor: Arc<dyn DependencyExtractor>,
    modernization: Option<Arc<dyn ModernizationSignalBuilder>>,
}

impl Default for RepositoryGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryGraphBuilder {
    pub fn new() -> Self {
        Self {
            rules: Arc::new(AnalysisRules::default()),
            scanner: None,
            detector: Arc::new(NoProjects),
            linker: Arc::new(PrefixProjectLinker),
            extractor: Arc::new(NoProjects),
            modernization: None,
        }
    }

    pub fn with_rules(mut self, rules: AnalysisRules) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    pub fn scanner(mut self, scanner: impl FileScanner + 'static) -> Self {
        self.scanner = Some(Arc::new(scanner));
        self
    }

    pub fn detector(mut self, detector: impl ProjectDetector + 'static) -> Self {
        self.detector = Arc::new(detector);
        self
    }

    pub fn linker(mut self, linker: impl ProjectLinker + 'static) -> Self {
        self.linker = Arc::new(linker);
        self
    }

    pub fn extractor(mut self, extractor: impl DependencyExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Use one value as both detector and extractor (a project catalog).
    pub fn catalog<C>(mut self, catalog: C) -> Self
    where
        C: ProjectDetector + DependencyExtractor + 'static,
    {
        let shared = Arc::new(catalog);
        self.detector = shared.clone();
        self.extractor = shared;
        self
    }

    pub fn modernization(mut self, builder: impl ModernizationSignalBuilder + 'static) -> Self {
        self.modernization = Some(Arc::new(builder));
        self
    }

    pub fn rules(&self) -> &AnalysisRules {
        &self.rules
    }

    /// Scan the repository and compute everything the unchanged check needs.
    pub fn prepare(&self, root: &Path, repository_name: &str) -> Result<ScannedRepository> {
        let root_path = root.to_string_lossy().trim().to_string();
        if root_path.is_empty() {
            return Err(Error::InvalidInput(
                "repository root path is blank".to_string(),
            ));
        }
        if repository_name.trim().is_empty() {
            return Err(Error::InvalidInput("repository name is blank".to_string()));
        }
        let scanner = self
            .scanner
            .as_ref()
            .ok_or(Error::MissingCollaborator("file scanner"))?;

        let start = Instant::now();
        let scanned = scanner.scan(root)?;
        let files = build_file_nodes(&scanned, &self.rules);
        let metrics = aggregate(&files);
        let repository_hash = compute_repository_hash(&files);

        info!(
            "Scanned {} files ({} text, {} binary) under {}",
            metrics.total_files,
            metrics.text_files,
            metrics.binary_files,
            root_path
        );
        debug!(
            hash = %repository_hash,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Repository hash computed"
        );

        Ok(ScannedRepository {
            root_path,
            repository_name: repository_name.trim().to_string(),
            scanned,
            files,
            metrics,
            repository_hash,
        })
    }

    /// Run the project stages on a prepared snapshot.
    pub fn complete(&self, prepared: ScannedRepository, assessed_at: DateTime<Utc>) -> RepositoryGraph {
        let start = Instant::now();
        let rules = self.rules.as_ref();
        let root = Path::new(&prepared.root_path);

        // 1. Detection
        let detection = self.detector.detect(root, &prepared.scanned);
        let descriptors = normalize_descriptors(detection.projects);
        let technologies = normalize_technologies(detection.technologies);
        info!(
            "Detected {} projects and {} technologies",
            descriptors.len(),
            technologies.len()
        );

        // 2. Linking
        let files = link_files(prepared.files, &descriptors, self.linker.as_ref());
        let unassigned = files.iter().filter(|f| f.project_id.is_none()).count();
        debug!("Linked files, {} unassigned", unassigned);

        let partitions = partition_by_project(&files);
        let no_files: Vec<&RepositoryFileNode> = Vec::new();
        let files_of = |id: &str| partitions.get(id).unwrap_or(&no_files);

        let mut projects: Vec<RepositoryProjectNode> = descriptors
            .iter()
            .map(|d| RepositoryProjectNode {
                id: d.id.clone(),
                name: d.name.clone(),
                framework: d.framework.clone(),
                project_type: d.project_type.clone(),
                root_path: d.root_path.clone(),
                ..Default::default()
            })
            .collect();

        // 3. Project metrics
        for project in &mut projects {
            project.metrics = project_metrics(files_of(&project.id));
        }

        // 4. Dependencies
        for (project, descriptor) in projects.iter_mut().zip(&descriptors) {
            project.dependencies = self.extractor.extract(root, descriptor);
        }

        // 5. Project dependency summaries
        for project in &mut projects {
            project.dependency_summary =
                summarize_project(&project.dependencies, project.metrics.totals.total_lines_of_code);
        }

        // 6. Repository dependency summary
        let dependency_summary = summarize_repository(&projects, prepared.metrics.total_lines_of_code);
        debug!(
            "Summarized {} dependencies across {} projects",
            dependency_summary.summary.total_dependencies,
            projects.len()
        );

        // 7. Structural signals
        for project in &mut projects {
            project.structural_signals = structural::project_signals(project, rules);
        }
        let structural_signals = structural::repository_signals(&projects, &files);

        // 8. Architecture signals
        for project in &mut projects {
            project.architecture_signals =
                architecture::project_signals(files_of(&project.id), &project.dependencies, rules);
        }
        let architecture_signals = architecture::repository_signals(&projects);

        // 9. Modernization signals
        if let Some(builder) = &self.modernization {
            for project in &mut projects {
                project.modernization_signals = builder.build(project);
            }
        }
        let modernization_signals = modernization::repository_signals(&projects);

        info!(
            "Assessed {} in {:.1}ms",
            prepared.repository_name,
            start.elapsed().as_secs_f64() * 1000.0
        );

        RepositoryGraph {
            metadata: RepositoryMetadata {
                root_path: prepared.root_path,
                repository_name: prepared.repository_name,
                repository_hash: prepared.repository_hash,
                assessed_at,
            },
            files,
            projects,
            technologies,
            metrics: prepared.metrics,
            dependency_summary,
            structural_signals,
            architecture_signals,
            modernization_signals,
        }
    }

    /// `prepare` then `complete`, stamped with the current time.
    pub fn build(&self, root: &Path, repository_name: &str) -> Result<RepositoryGraph> {
        let prepared = self.prepare(root, repository_name)?;
        Ok(self.complete(prepared, Utc::now()))
    }
}

/// Order projects by id and keep the first descriptor for each id.
fn normalize_descriptors(mut descriptors: Vec<ProjectDescriptor>) -> Vec<ProjectDescriptor> {
    descriptors.retain(|d| {
        let keep = !d.id.trim().is_empty();
        if !keep {
            warn!("Dropping project '{}' with a blank id", d.name);
        }
        keep
    });
    // Stable sort: the first detected descriptor survives deduplication.
    descriptors.sort_by(|a, b| cmp_ignore_case(&a.id, &b.id));

    let mut seen = HashSet::new();
    descriptors.retain(|d| {
        let first = seen.insert(d.id.clone());
        if !first {
            warn!("Duplicate project id {}, keeping first", d.id);
        }
        first
    });
    descriptors
}

fn normalize_technologies(mut technologies: Vec<TechnologyDetection>) -> Vec<TechnologyDetection> {
    technologies.sort_by(|a, b| {
        cmp_ignore_case(&a.category, &b.category)
            .then_with(|| cmp_ignore_case(&a.name, &b.name))
            .then_with(|| cmp_option_ignore_case(a.version.as_deref(), b.version.as_deref()))
            .then_with(|| cmp_ignore_case(&a.source, &b.source))
    });
    technologies.dedup();
    technologies
}

fn partition_by_project(files: &[RepositoryFileNode]) -> BTreeMap<&str, Vec<&RepositoryFileNode>> {
    let mut partitions: BTreeMap<&str, Vec<&RepositoryFileNode>> = BTreeMap::new();
    for file in files {
        if let Some(id) = file.project_id.as_deref() {
            partitions.entry(id).or_default().push(file);
        }
    }
    partitions
}
