//! # EnvWarden Core
//!
//! This crate reconciles the deployment environments of a GitHub repository against a
//! desired-state document. Only differences result in mutating API calls, so running the
//! same document twice leaves the repository untouched the second time.
//!
//! ## Overview
//!
//! A run proceeds in this order:
//! 1. The desired-state document is loaded ([`DesiredState`])
//! 2. Environments that exist remotely but are not described are deleted
//! 3. For every described environment, reviewers are resolved ([`ReviewerReconciler`])
//! 4. The desired configuration is diffed against GitHub ([`EnvironmentPlanner`])
//! 5. A create or update call is issued only when the plan requires one ([`EnvironmentApplier`])
//!
//! [`Orchestrator`] drives the whole sequence and produces a [`RunReport`].
//!
//! ## Examples
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use env_warden_core::{DesiredState, Orchestrator, RepositoryIdentity, RunOptions};
//! use github_client::{create_token_client, GitHubClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(GitHubClient::new(create_token_client("ghp_token")?));
//! let repository: RepositoryIdentity = "my-org/my-repo".parse()?;
//! let desired = DesiredState::load(Path::new(".github/environments.yaml"))?;
//!
//! let orchestrator = Orchestrator::new(client, repository);
//! let report = orchestrator.run(&desired, &RunOptions { dry_run: true }).await;
//! println!("{}: {}", report.status, report.message);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Problems with individual reviewers are reported as [`ReviewerDiagnostic`] values and
//! never abort a run. Everything else surfaces as an [`EnvWardenError`].

use std::fmt;
use std::str::FromStr;

pub mod apply;
pub mod classification;
pub mod desired_state;
pub mod environment_config;
pub mod errors;
pub mod identity;
pub mod orchestrator;
pub mod plan;
pub mod reviewers;

#[cfg(test)]
mod test_support;

pub use apply::{ApplyOutcome, ApplyStatus, EnvironmentApplier};
pub use desired_state::{
    DesiredState, EnvironmentSpec, InvalidReviewerReason, ReviewerEntry, ReviewerRecord,
    ReviewerRef, DEFAULT_CONFIG_PATH,
};
pub use environment_config::{normalize_reviewers, EnvironmentConfig, NormalizedReviewer};
pub use errors::{EnvWardenError, EnvWardenResult};
pub use identity::IdentityResolver;
pub use orchestrator::{
    EnvironmentReport, EnvironmentStatus, Orchestrator, RunOptions, RunReport, RunStatus,
};
pub use plan::{ConfigField, EnvironmentPlan, EnvironmentPlanner, PlanAction};
pub use reviewers::{ReviewerDiagnostic, ReviewerReconciler, ReviewerResolution};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// The repository whose environments are being reconciled.
///
/// The owner doubles as the organization in which teams are looked up.
///
/// # Examples
///
/// ```
/// use env_warden_core::RepositoryIdentity;
///
/// let repository: RepositoryIdentity = "octo-org/hello-world".parse().unwrap();
/// assert_eq!(repository.owner(), "octo-org");
/// assert_eq!(repository.repo(), "hello-world");
/// assert_eq!(repository.to_string(), "octo-org/hello-world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    owner: String,
    repo: String,
}

impl RepositoryIdentity {
    /// Creates a repository identity from its two parts.
    ///
    /// # Errors
    ///
    /// Returns `EnvWardenError::InvalidRepository` if either part is empty.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> EnvWardenResult<Self> {
        let owner = owner.into();
        let repo = repo.into();
        if owner.trim().is_empty() || repo.trim().is_empty() {
            return Err(EnvWardenError::InvalidRepository(format!(
                "{}/{}",
                owner, repo
            )));
        }
        Ok(Self { owner, repo })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl FromStr for RepositoryIdentity {
    type Err = EnvWardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo)) if !repo.contains('/') => Self::new(owner, repo),
            _ => Err(EnvWardenError::InvalidRepository(s.to_string())),
        }
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
