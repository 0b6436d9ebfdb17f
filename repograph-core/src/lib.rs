//! repograph core - deterministic repository structure analysis.
//!
//! Given the scanned files of a source tree, this crate builds a normalized
//! graph of files, projects and dependencies, rolls metrics up from file to
//! project to repository, computes a stable content hash for change
//! detection and derives modernization triage signals.
//!
//! # Features
//!
//! - **Order independence**: every sort and group site uses one explicit
//!   case-insensitive comparison, so enumeration order never leaks into output
//! - **Multi-level metrics**: the same reducer runs over the repository and
//!   each project partition
//! - **Dependency taxonomy**: scope buckets, version states, ecosystems and
//!   density per 1000 lines of code
//! - **Signals**: structural, architecture and modernization signals from
//!   threshold comparisons over aggregated facts
//! - **Pluggable collaborators**: scanning, detection, linking, extraction and
//!   modernization records are traits with reference implementations
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use repograph_core::{
//!     FsScanner, ProjectCatalog, RepositoryGraphBuilder, RuntimeModernizationBuilder,
//! };
//!
//! # fn main() -> repograph_core::Result<()> {
//! let catalog = ProjectCatalog::load(Path::new("catalog.json"))?;
//! let graph = RepositoryGraphBuilder::new()
//!     .scanner(FsScanner::new())
//!     .catalog(catalog)
//!     .modernization(RuntimeModernizationBuilder::default())
//!     .build(Path::new("."), "my-repo")?;
//!
//! println!("{} files, hash {}", graph.metrics.total_files, graph.metadata.repository_hash);
//! # Ok(())
//! # }
//! ```

pub mod assessment;
pub mod builder;
pub mod catalog;
pub mod collaborators;
pub mod dependencies;
pub mod error;
pub mod hash;
pub mod linker;
pub mod metrics;
pub mod nodes;
pub mod ordering;
pub mod rules;
pub mod scanner;
pub mod signals;
pub mod types;

pub use assessment::{
    AssessmentHistory, AssessmentRequest, InMemoryAssessmentHistory, RepositoryAssessmentResult,
    RepositoryAssessor,
};
pub use builder::{RepositoryGraphBuilder, ScannedRepository};
pub use catalog::{CatalogProject, ProjectCatalog};
pub use collaborators::{
    DependencyExtractor, FileScanner, ModernizationSignalBuilder, NoProjects, ProjectDetector,
    ProjectLinker, StaticFiles,
};
pub use error::{Error, Result};
pub use hash::compute_repository_hash;
pub use linker::PrefixProjectLinker;
pub use rules::AnalysisRules;
pub use scanner::{FsScanner, ScanError, ScannedFile};
pub use signals::RuntimeModernizationBuilder;
pub use types::*;
