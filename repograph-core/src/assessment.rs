//! Assessment entry point with the unchanged short-circuit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::info;

use crate::builder::RepositoryGraphBuilder;
use crate::error::Result;
use crate::types::RepositoryGraph;

/// Message attached to results skipped by the unchanged check.
pub const UNCHANGED_MESSAGE: &str = "Repository content is unchanged since the last assessment";

/// Remembers the last repository hash per repository name.
pub trait AssessmentHistory: Send + Sync {
    fn previous_hash(&self, repository: &str) -> Option<String>;
    fn record(&self, repository: &str, hash: &str);
}

/// Process-local history.
#[derive(Debug, Default)]
pub struct InMemoryAssessmentHistory {
    hashes: RwLock<HashMap<String, String>>,
}

impl InMemoryAssessmentHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssessmentHistory for InMemoryAssessmentHistory {
    fn previous_hash(&self, repository: &str) -> Option<String> {
        // A poisoned lock still holds a consistent map of strings.
        let hashes = self.hashes.read().unwrap_or_else(|e| e.into_inner());
        hashes.get(repository).cloned()
    }

    fn record(&self, repository: &str, hash: &str) {
        let mut hashes = self.hashes.write().unwrap_or_else(|e| e.into_inner());
        hashes.insert(repository.to_string(), hash.to_string());
    }
}

/// What to assess.
#[derive(Clone, Debug)]
pub struct AssessmentRequest {
    pub root_path: PathBuf,
    pub repository_name: String,
    pub branch: Option<String>,
    pub resolved_commit: Option<String>,
    /// Timestamp for the graph metadata; `None` means now.
    pub assessed_at: Option<DateTime<Utc>>,
}

impl AssessmentRequest {
    pub fn new(root_path: impl Into<PathBuf>, repository_name: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            repository_name: repository_name.into(),
            branch: None,
            resolved_commit: None,
            assessed_at: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.resolved_commit = Some(commit.into());
        self
    }

    pub fn assessed_at(mut self, at: DateTime<Utc>) -> Self {
        self.assessed_at = Some(at);
        self
    }
}

/// Outcome of one assessment. `graph` is `None` exactly when unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryAssessmentResult {
    pub repository_name: String,
    pub branch: Option<String>,
    pub resolved_commit: Option<String>,
    pub repository_hash: String,
    pub is_unchanged: bool,
    pub message: Option<String>,
    pub graph: Option<RepositoryGraph>,
}

/// Runs assessments, optionally skipping repositories whose hash matches the
/// last recorded one.
///
/// Without a history every assessment is computed fresh.
pub struct RepositoryAssessor {
    builder: RepositoryGraphBuilder,
    history: Option<Box<dyn AssessmentHistory>>,
}

impl RepositoryAssessor {
    pub fn new(builder: RepositoryGraphBuilder) -> Self {
        Self {
            builder,
            history: None,
        }
    }

    pub fn with_history(mut self, history: impl AssessmentHistory + 'static) -> Self {
        self.history = Some(Box::new(history));
        self
    }

    pub fn builder(&self) -> &RepositoryGraphBuilder {
        &self.builder
    }

    pub fn assess(&self, request: &AssessmentRequest) -> Result<RepositoryAssessmentResult> {
        let prepared = self
            .builder
            .prepare(&request.root_path, &request.repository_name)?;
        let repository_hash = prepared.repository_hash.clone();
        let repository_name = prepared.repository_name.clone();

        let previous = self
            .history
            .as_ref()
            .and_then(|h| h.previous_hash(&repository_name));

        if previous.as_deref() == Some(repository_hash.as_str()) {
            info!("{} unchanged ({}), skipping analysis", repository_name, repository_hash);
            return Ok(RepositoryAssessmentResult {
                repository_name,
                branch: request.branch.clone(),
                resolved_commit: request.resolved_commit.clone(),
                repository_hash,
                is_unchanged: true,
                message: Some(UNCHANGED_MESSAGE.to_string()),
                graph: None,
            });
        }

        let graph = self
            .builder
            .complete(prepared, request.assessed_at.unwrap_or_else(Utc::now));

        if let Some(history) = &self.history {
            history.record(&repository_name, &repository_hash);
        }

        Ok(RepositoryAssessmentResult {
            repository_name,
            branch: request.branch.clone(),
            resolved_commit: request.resolved_commit.clone(),
            repository_hash,
            is_unchanged: false,
            message: None,
            graph: Some(graph),
        })
    }
}
