//! Diffing desired environment configuration against GitHub.

use std::fmt;
use std::sync::Arc;

use github_client::EnvironmentClient;
use tracing::{debug, instrument};

use crate::classification::is_not_found;
use crate::{
    normalize_reviewers, EnvWardenError, EnvWardenResult, EnvironmentConfig, RepositoryIdentity,
};

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;

/// What has to happen to bring an environment to its desired configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// The environment does not exist.
    Create,
    /// The environment exists with a different configuration.
    Update,
    /// The environment already matches.
    NoChange,
}

impl PlanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanAction::Create => "create",
            PlanAction::Update => "update",
            PlanAction::NoChange => "none",
        }
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compared configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    WaitTimer,
    Reviewers,
    PreventSelfReview,
    DeploymentBranchPolicy,
}

impl ConfigField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigField::WaitTimer => "wait_timer",
            ConfigField::Reviewers => "reviewers",
            ConfigField::PreventSelfReview => "prevent_self_review",
            ConfigField::DeploymentBranchPolicy => "deployment_branch_policy",
        }
    }
}

/// The result of planning one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentPlan {
    pub action: PlanAction,
    /// The configuration currently on GitHub, `None` when the environment is missing.
    pub current: Option<EnvironmentConfig>,
    /// Fields that differ; empty unless the action is `Update`.
    pub changes: Vec<ConfigField>,
}

/// Lists the fields in which two configurations differ.
///
/// Reviewer lists are compared in normalized form, so ordering and the reviewer shape
/// do not matter and a missing list equals an empty one. All other fields use plain
/// equality, so an absent wait timer never equals `0`.
pub fn diff(current: &EnvironmentConfig, desired: &EnvironmentConfig) -> Vec<ConfigField> {
    let mut changes = Vec::new();

    if current.wait_timer != desired.wait_timer {
        changes.push(ConfigField::WaitTimer);
    }
    if normalize_reviewers(current.reviewers.as_deref())
        != normalize_reviewers(desired.reviewers.as_deref())
    {
        changes.push(ConfigField::Reviewers);
    }
    if current.prevent_self_review != desired.prevent_self_review {
        changes.push(ConfigField::PreventSelfReview);
    }
    if current.deployment_branch_policy != desired.deployment_branch_policy {
        changes.push(ConfigField::DeploymentBranchPolicy);
    }

    changes
}

/// Decides whether an environment has to be created, updated or left alone.
pub struct EnvironmentPlanner {
    client: Arc<dyn EnvironmentClient>,
    repository: RepositoryIdentity,
}

impl EnvironmentPlanner {
    pub fn new(client: Arc<dyn EnvironmentClient>, repository: RepositoryIdentity) -> Self {
        Self { client, repository }
    }

    /// Plans the changes needed for `environment` to match `desired`.
    ///
    /// # Errors
    ///
    /// * `EnvWardenError::MalformedRemoteState` if GitHub answers without a record.
    /// * `EnvWardenError::GitHub` for any failure other than a missing environment.
    #[instrument(skip(self, desired), fields(environment = %environment))]
    pub async fn plan(
        &self,
        environment: &str,
        desired: &EnvironmentConfig,
    ) -> EnvWardenResult<EnvironmentPlan> {
        let remote = match self
            .client
            .get_environment(self.repository.owner(), self.repository.repo(), environment)
            .await
        {
            Ok(Some(remote)) => remote,
            Ok(None) => {
                return Err(EnvWardenError::MalformedRemoteState {
                    environment: environment.to_string(),
                })
            }
            Err(e) if is_not_found(&e) => {
                debug!("Environment {} does not exist", environment);
                return Ok(EnvironmentPlan {
                    action: PlanAction::Create,
                    current: None,
                    changes: Vec::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let current = EnvironmentConfig::from_remote(&remote);
        let changes = diff(&current, desired);
        let action = if changes.is_empty() {
            PlanAction::NoChange
        } else {
            PlanAction::Update
        };

        debug!(
            action = %action,
            changes = ?changes.iter().map(ConfigField::as_str).collect::<Vec<_>>(),
            "Planned environment"
        );

        Ok(EnvironmentPlan {
            action,
            current: Some(current),
            changes,
        })
    }
}
