//! Error types for repograph-core.

use thiserror::Error;

use crate::scanner::ScanError;

/// Result type alias for repograph-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an assessment.
///
/// Empty file sets, projects without dependencies, unassigned files and
/// missing optional metadata are valid data states and never show up here.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied unusable input (blank root path, blank name).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required collaborator was not registered with the builder.
    #[error("Configuration error: no {0} configured")]
    MissingCollaborator(&'static str),

    /// The file scanner failed to enumerate the repository.
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    /// Custom rule tables could not be parsed.
    #[error("Invalid rule configuration: {0}")]
    Rules(#[from] toml::de::Error),

    /// A project catalog file is not valid JSON for the catalog schema.
    #[error("Invalid project catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a configuration problem rather than bad input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingCollaborator(_) | Error::Rules(_) | Error::Catalog(_)
        )
    }
}
