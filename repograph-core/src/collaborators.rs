//! Seams to the external capabilities the pipeline consumes.
//!
//! Scanning, project detection, file linking, dependency extraction and
//! per-project modernization records all live outside the core. Each is a
//! `Send + Sync` trait so independent assessments can run on separate
//! threads against shared, read-only collaborators.

use std::path::Path;

use crate::scanner::{ScanError, ScannedFile};
use crate::types::{
    Detection, ModernizationSignals, ProjectDependency, ProjectDescriptor, RepositoryFileNode,
    RepositoryProjectNode,
};

/// Supplies the scanned files of a repository root.
pub trait FileScanner: Send + Sync {
    /// Enumerate files under `root`. Order is irrelevant to the pipeline.
    fn scan(&self, root: &Path) -> Result<Vec<ScannedFile>, ScanError>;
}

/// Detects projects and technologies from repository content.
pub trait ProjectDetector: Send + Sync {
    fn detect(&self, root: &Path, files: &[ScannedFile]) -> Detection;
}

/// Assigns a file to at most one project.
pub trait ProjectLinker: Send + Sync {
    /// Returns the id of the owning project, or `None` for unassigned files.
    fn link(&self, file: &RepositoryFileNode, projects: &[ProjectDescriptor]) -> Option<String>;
}

/// Extracts the raw dependency list of a project.
pub trait DependencyExtractor: Send + Sync {
    fn extract(&self, root: &Path, project: &ProjectDescriptor) -> Vec<ProjectDependency>;
}

/// Builds the opaque modernization record of a single project.
pub trait ModernizationSignalBuilder: Send + Sync {
    fn build(&self, project: &RepositoryProjectNode) -> Option<ModernizationSignals>;
}

/// Detector that finds nothing; used when no detector is registered.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProjects;

impl ProjectDetector for NoProjects {
    fn detect(&self, _root: &Path, _files: &[ScannedFile]) -> Detection {
        Detection::default()
    }
}

impl DependencyExtractor for NoProjects {
    fn extract(&self, _root: &Path, _project: &ProjectDescriptor) -> Vec<ProjectDependency> {
        Vec::new()
    }
}

/// Scanner over an in-memory file list. Handy for tests and for callers
/// that already hold scan results from elsewhere.
#[derive(Clone, Debug, Default)]
pub struct StaticFiles(pub Vec<ScannedFile>);

impl FileScanner for StaticFiles {
    fn scan(&self, _root: &Path) -> Result<Vec<ScannedFile>, ScanError> {
        Ok(self.0.clone())
    }
}
