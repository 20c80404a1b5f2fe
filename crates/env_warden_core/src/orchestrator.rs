//! Reconciliation of all environments of a repository.

use std::fmt;
use std::sync::Arc;

use github_client::EnvironmentClient;
use tracing::{error, info, instrument, warn};

use crate::{
    ApplyOutcome, ApplyStatus, DesiredState, EnvWardenError, EnvWardenResult, EnvironmentApplier,
    EnvironmentPlanner, EnvironmentSpec, PlanAction, RepositoryIdentity, ReviewerReconciler,
};

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

const SUCCESS_MESSAGE: &str = "All environments configured successfully";

/// Options for a reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute and log the changes without making any mutating call.
    pub dry_run: bool,
}

/// Outcome of processing one environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentStatus {
    Success,
    NoChange,
    Failure,
}

impl EnvironmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentStatus::Success => "success",
            EnvironmentStatus::NoChange => "nochange",
            EnvironmentStatus::Failure => "failure",
        }
    }
}

impl fmt::Display for EnvironmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ApplyStatus> for EnvironmentStatus {
    fn from(value: ApplyStatus) -> Self {
        match value {
            ApplyStatus::Success => EnvironmentStatus::Success,
            ApplyStatus::NoChange => EnvironmentStatus::NoChange,
        }
    }
}

/// The report entry of one deleted or configured environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentReport {
    pub name: String,
    pub status: EnvironmentStatus,
    pub message: String,
}

impl EnvironmentReport {
    fn from_outcome(name: &str, outcome: ApplyOutcome) -> Self {
        Self {
            name: name.to_string(),
            status: outcome.status.into(),
            message: outcome.message,
        }
    }

    fn failure(name: &str, error: &EnvWardenError) -> Self {
        Self {
            name: name.to_string(),
            status: EnvironmentStatus::Failure,
            message: error.to_string(),
        }
    }
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => f.write_str("success"),
            RunStatus::Failure => f.write_str("failure"),
        }
    }
}

/// The result of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub status: RunStatus,
    /// `All environments configured successfully`, or the text of the error that
    /// stopped the run.
    pub message: String,
    /// One entry per processed environment, deletions first.
    pub environments: Vec<EnvironmentReport>,
}

/// Drives a full reconciliation of one repository.
///
/// Environments are processed one at a time in document order, after all deletions.
/// The first error stops the run.
pub struct Orchestrator {
    client: Arc<dyn EnvironmentClient>,
    repository: RepositoryIdentity,
    reconciler: ReviewerReconciler,
    planner: EnvironmentPlanner,
    applier: EnvironmentApplier,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn EnvironmentClient>, repository: RepositoryIdentity) -> Self {
        Self {
            reconciler: ReviewerReconciler::new(client.clone(), repository.clone()),
            planner: EnvironmentPlanner::new(client.clone(), repository.clone()),
            applier: EnvironmentApplier::new(client.clone(), repository.clone()),
            client,
            repository,
        }
    }

    /// Reconciles the repository against the desired state.
    ///
    /// Never fails; errors are reported through the returned [`RunReport`].
    #[instrument(skip(self, desired), fields(repository = %self.repository, dry_run = options.dry_run))]
    pub async fn run(&self, desired: &DesiredState, options: &RunOptions) -> RunReport {
        let mut environments = Vec::new();

        match self.reconcile(desired, options, &mut environments).await {
            Ok(()) => {
                info!("{}", SUCCESS_MESSAGE);
                RunReport {
                    status: RunStatus::Success,
                    message: SUCCESS_MESSAGE.to_string(),
                    environments,
                }
            }
            Err(e) => {
                error!("Run failed: {}", e);
                RunReport {
                    status: RunStatus::Failure,
                    message: e.to_string(),
                    environments,
                }
            }
        }
    }

    async fn reconcile(
        &self,
        desired: &DesiredState,
        options: &RunOptions,
        reports: &mut Vec<EnvironmentReport>,
    ) -> EnvWardenResult<()> {
        let existing = self
            .client
            .list_environments(self.repository.owner(), self.repository.repo())
            .await
            .map_err(EnvWardenError::ListEnvironments)?;

        let to_delete: Vec<String> = existing
            .into_iter()
            .filter(|name| !desired.contains(name))
            .collect();

        if !to_delete.is_empty() {
            info!(
                "Found {} environments to delete: {}",
                to_delete.len(),
                to_delete.join(", ")
            );

            if options.dry_run {
                info!("[DRY RUN] Would delete environments: {}", to_delete.join(", "));
            } else {
                for name in &to_delete {
                    match self.applier.delete(name).await {
                        Ok(outcome) => {
                            info!("{}", outcome.message);
                            reports.push(EnvironmentReport::from_outcome(name, outcome));
                        }
                        Err(e) => {
                            error!("Failed to delete environment {}: {}", name, e);
                            reports.push(EnvironmentReport::failure(name, &e));
                            return Err(e);
                        }
                    }
                }
            }
        }

        if desired.is_empty() {
            info!("No environments to configure");
            return Ok(());
        }

        for (name, spec) in desired.environments() {
            info!("Processing environment: {}", name);
            match self.process(name, spec, options).await {
                Ok(outcome) => {
                    info!("{}", outcome.message);
                    reports.push(EnvironmentReport::from_outcome(name, outcome));
                }
                Err(e) => {
                    error!("Failed to configure environment {}: {}", name, e);
                    reports.push(EnvironmentReport::failure(name, &e));
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Resolves, plans and, unless in dry-run mode, applies one environment.
    async fn process(
        &self,
        name: &str,
        spec: &EnvironmentSpec,
        options: &RunOptions,
    ) -> EnvWardenResult<ApplyOutcome> {
        let reviewers = match &spec.reviewers {
            Some(entries) => {
                let resolution = self.reconciler.resolve(name, entries).await?;
                if !resolution.failed_teams().is_empty() {
                    warn!(
                        environment = %name,
                        "Continuing without teams: {}",
                        resolution.failed_teams().join(", ")
                    );
                }
                resolution.reviewers
            }
            None => Vec::new(),
        };

        // The full reviewer list is always sent so that removed reviewers are cleared
        let config = spec.to_config(Some(reviewers));
        let plan = self.planner.plan(name, &config).await?;

        if options.dry_run {
            let outcome = match plan.action {
                PlanAction::NoChange => ApplyOutcome {
                    status: ApplyStatus::NoChange,
                    message: format!("[DRY RUN] Environment {} is up to date", name),
                },
                action => ApplyOutcome {
                    status: ApplyStatus::Success,
                    message: format!("[DRY RUN] Would {} environment {}", action, name),
                },
            };
            return Ok(outcome);
        }

        self.applier.apply(name, &config, &plan).await
    }
}
