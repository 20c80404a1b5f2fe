//! Error types for environment reconciliation.
//!
//! Per-reviewer problems are not errors; they are reported as
//! [`ReviewerDiagnostic`](crate::ReviewerDiagnostic) values. The variants here abort
//! the current operation and carry the text that ends up in the run's failure message.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that abort an environment operation or a whole run.
#[derive(Error, Debug)]
pub enum EnvWardenError {
    /// An unexpected GitHub API failure, reported with GitHub's message verbatim.
    #[error(transparent)]
    GitHub(#[from] github_client::Error),

    /// GitHub answered successfully but did not return an environment record.
    #[error("GitHub returned no data for environment '{environment}'")]
    MalformedRemoteState { environment: String },

    /// The desired-state document could not be read or parsed.
    #[error("Failed to load config from {path}: {reason}")]
    ConfigLoad { path: String, reason: String },

    /// The existing environments could not be listed.
    #[error("Failed to get environments: {0}")]
    ListEnvironments(github_client::Error),

    /// The repository identity was not in `owner/repo` form.
    #[error("Repository must be in the form 'owner/repo', got '{0}'")]
    InvalidRepository(String),
}

impl EnvWardenError {
    /// Creates a config load error for the given path.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for reconciliation operations.
pub type EnvWardenResult<T> = Result<T, EnvWardenError>;
