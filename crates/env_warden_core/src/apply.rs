//! Applying environment plans to GitHub.

use std::fmt;
use std::sync::Arc;

use github_client::EnvironmentClient;
use tracing::{debug, info, instrument};

use crate::classification::is_not_found;
use crate::{
    EnvWardenResult, EnvironmentConfig, EnvironmentPlan, EnvironmentPlanner, PlanAction,
    RepositoryIdentity,
};

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;

/// Whether an operation changed anything on GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStatus {
    Success,
    NoChange,
}

impl ApplyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyStatus::Success => "success",
            ApplyStatus::NoChange => "nochange",
        }
    }
}

impl fmt::Display for ApplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of an environment operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub status: ApplyStatus,
    pub message: String,
}

impl ApplyOutcome {
    fn success(message: impl Into<String>) -> Self {
        Self {
            status: ApplyStatus::Success,
            message: message.into(),
        }
    }

    fn no_change(message: impl Into<String>) -> Self {
        Self {
            status: ApplyStatus::NoChange,
            message: message.into(),
        }
    }
}

/// Issues the mutating calls for one repository's environments.
pub struct EnvironmentApplier {
    client: Arc<dyn EnvironmentClient>,
    planner: EnvironmentPlanner,
    repository: RepositoryIdentity,
}

impl EnvironmentApplier {
    pub fn new(client: Arc<dyn EnvironmentClient>, repository: RepositoryIdentity) -> Self {
        let planner = EnvironmentPlanner::new(client.clone(), repository.clone());
        Self {
            client,
            planner,
            repository,
        }
    }

    /// Carries out a plan.
    ///
    /// Creates and updates send the whole desired configuration in a single call. A plan
    /// without changes makes no call at all.
    ///
    /// # Errors
    ///
    /// Returns `EnvWardenError::GitHub` if the create or update call fails.
    #[instrument(skip(self, desired, plan), fields(environment = %environment, action = %plan.action))]
    pub async fn apply(
        &self,
        environment: &str,
        desired: &EnvironmentConfig,
        plan: &EnvironmentPlan,
    ) -> EnvWardenResult<ApplyOutcome> {
        let message = match plan.action {
            PlanAction::NoChange => {
                return Ok(ApplyOutcome::no_change(
                    "No update required: environment is up to date.",
                ))
            }
            PlanAction::Create => "Update successful: environment created.",
            PlanAction::Update => "Update successful: environment configuration updated.",
        };

        self.client
            .create_or_update_environment(
                self.repository.owner(),
                self.repository.repo(),
                environment,
                &desired.to_payload(),
            )
            .await?;

        Ok(ApplyOutcome::success(message))
    }

    /// Plans and applies the desired configuration of an environment.
    ///
    /// # Errors
    ///
    /// Returns any error from planning or applying.
    pub async fn configure(
        &self,
        environment: &str,
        desired: &EnvironmentConfig,
    ) -> EnvWardenResult<ApplyOutcome> {
        let plan = self.planner.plan(environment, desired).await?;
        self.apply(environment, desired, &plan).await
    }

    /// Deletes an environment if it exists.
    ///
    /// # Errors
    ///
    /// Returns `EnvWardenError::GitHub` for any failure other than a missing environment.
    #[instrument(skip(self), fields(environment = %environment))]
    pub async fn delete(&self, environment: &str) -> EnvWardenResult<ApplyOutcome> {
        let owner = self.repository.owner();
        let repo = self.repository.repo();

        let exists = match self.client.get_environment(owner, repo, environment).await {
            Ok(record) => record.is_some(),
            Err(e) if is_not_found(&e) => false,
            Err(e) => return Err(e.into()),
        };
        if !exists {
            debug!("Environment {} does not exist, nothing to delete", environment);
            return Ok(ApplyOutcome::no_change(format!(
                "No update required: environment '{}' does not exist.",
                environment
            )));
        }

        self.client
            .delete_environment(owner, repo, environment)
            .await?;

        info!("Deleted environment {}", environment);
        Ok(ApplyOutcome::success(format!(
            "Update successful: environment '{}' deleted.",
            environment
        )))
    }
}
