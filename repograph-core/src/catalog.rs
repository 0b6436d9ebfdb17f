//! Static project catalog.
//!
//! Project detection and manifest parsing happen outside this crate. A
//! catalog carries their results (project descriptors, technology
//! detections and per-project dependency lists) as JSON and plays both the
//! detector and the extractor role in the pipeline.
//!
//! ```json
//! {
//!   "projects": [
//!     {
//!       "id": "api",
//!       "name": "Api",
//!       "framework": "net8.0",
//!       "projectType": "web",
//!       "rootPath": "src/Api",
//!       "dependencies": [
//!         { "name": "Serilog", "version": "3.1.1", "ecosystem": "nuget" }
//!       ]
//!     }
//!   ],
//!   "technologies": [
//!     { "category": "runtime", "name": ".NET", "version": "8.0", "source": "src/Api/Api.csproj" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::collaborators::{DependencyExtractor, ProjectDetector};
use crate::error::Result;
use crate::scanner::ScannedFile;
use crate::types::{Detection, ProjectDependency, ProjectDescriptor, TechnologyDetection};

/// One catalog entry: a project descriptor plus its raw dependency list.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProject {
    #[serde(flatten)]
    pub descriptor: ProjectDescriptor,
    #[serde(default)]
    pub dependencies: Vec<ProjectDependency>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCatalog {
    #[serde(default)]
    pub projects: Vec<CatalogProject>,
    #[serde(default)]
    pub technologies: Vec<TechnologyDetection>,
}

impl ProjectCatalog {
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        debug!(
            "Loaded catalog {} ({} projects, {} technologies)",
            path.display(),
            catalog.projects.len(),
            catalog.technologies.len()
        );
        Ok(catalog)
    }

    pub fn with_project(mut self, descriptor: ProjectDescriptor, dependencies: Vec<ProjectDependency>) -> Self {
        self.projects.push(CatalogProject {
            descriptor,
            dependencies,
        });
        self
    }

    pub fn with_technology(mut self, technology: TechnologyDetection) -> Self {
        self.technologies.push(technology);
        self
    }
}

impl ProjectDetector for ProjectCatalog {
    fn detect(&self, _root: &Path, _files: &[ScannedFile]) -> Detection {
        Detection {
            projects: self.projects.iter().map(|p| p.descriptor.clone()).collect(),
            technologies: self.technologies.clone(),
        }
    }
}

impl DependencyExtractor for ProjectCatalog {
    /// Dependencies of the first catalog entry with the project's id.
    fn extract(&self, _root: &Path, project: &ProjectDescriptor) -> Vec<ProjectDependency> {
        self.projects
            .iter()
            .find(|p| p.descriptor.id == project.id)
            .map(|p| p.dependencies.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "projects": [
            {
                "id": "api",
                "name": "Api",
                "framework": "net8.0",
                "projectType": "web",
                "rootPath": "src/Api",
                "dependencies": [
                    { "name": "Serilog", "version": "3.1.1", "ecosystem": "nuget" },
                    { "name": "xunit", "versionSpec": "[2.4,3.0)", "scope": "test" }
                ]
            },
            { "id": "tool", "name": "Tool" }
        ],
        "technologies": [
            { "category": "runtime", "name": ".NET", "version": "8.0", "source": "src/Api/Api.csproj" }
        ]
    }"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = ProjectCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.projects.len(), 2);

        let api = &catalog.projects[0];
        assert_eq!(api.descriptor.framework.as_deref(), Some("net8.0"));
        assert_eq!(api.descriptor.project_type.as_deref(), Some("web"));
        assert_eq!(api.descriptor.root_path.as_deref(), Some("src/Api"));
        assert_eq!(api.dependencies[1].version_spec.as_deref(), Some("[2.4,3.0)"));

        let tool = &catalog.projects[1];
        assert!(tool.descriptor.framework.is_none());
        assert!(tool.dependencies.is_empty());
    }

    #[test]
    fn test_detector_and_extractor() {
        let catalog = ProjectCatalog::from_json_str(CATALOG).unwrap();
        let root = Path::new(".");

        let detection = catalog.detect(root, &[]);
        assert_eq!(detection.projects.len(), 2);
        assert_eq!(detection.technologies[0].name, ".NET");

        let deps = catalog.extract(root, &detection.projects[0]);
        assert_eq!(deps.len(), 2);
        assert!(catalog.extract(root, &detection.projects[1]).is_empty());

        let unknown = ProjectDescriptor {
            id: "ghost".to_string(),
            ..Default::default()
        };
        assert!(catalog.extract(root, &unknown).is_empty());
    }

    #[test]
    fn test_invalid_catalog_is_configuration_error() {
        let err = ProjectCatalog::from_json_str(r#"{"projects": [{"name": 3}]}"#).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, CATALOG).unwrap();
        assert_eq!(ProjectCatalog::load(&path).unwrap().projects.len(), 2);

        let missing = ProjectCatalog::load(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(crate::Error::Io(_))));
    }
}
