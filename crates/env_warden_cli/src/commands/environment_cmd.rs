//! Single-environment commands.
//!
//! These commands act on one environment by name without consulting the
//! desired-state document.

use std::sync::Arc;

use clap::Args;
use env_warden_core::classification::is_not_found;
use env_warden_core::{
    EnvironmentApplier, EnvironmentSpec, RepositoryIdentity, ReviewerEntry, ReviewerReconciler,
};
use github_client::models::DeploymentBranchPolicy;
use github_client::EnvironmentClient;
use tracing::{info, instrument};

use crate::errors::Error;
use crate::outputs::Outputs;

#[cfg(test)]
#[path = "environment_cmd_tests.rs"]
mod tests;

/// Arguments of the `configure` command.
#[derive(Args, Debug, Clone)]
pub struct ConfigureArgs {
    /// Name of the environment.
    pub name: String,

    /// Comma separated reviewers, for example `user:octocat,team:release-managers`.
    #[arg(long)]
    pub reviewers: Option<String>,

    /// Minutes to wait before a deployment may proceed.
    #[arg(long)]
    pub wait_timer: Option<u32>,

    /// Prevent the user who triggered a deployment from approving it.
    #[arg(long)]
    pub prevent_self_review: Option<bool>,

    /// Branch policy as JSON, for example
    /// `{"protected_branches":true,"custom_branch_policies":false}`.
    #[arg(long, value_parser = parse_branch_policy)]
    pub deployment_branch_policy: Option<DeploymentBranchPolicy>,
}

impl ConfigureArgs {
    fn to_spec(&self) -> EnvironmentSpec {
        EnvironmentSpec {
            wait_timer: self.wait_timer,
            reviewers: self.reviewers.as_deref().map(ReviewerEntry::parse_list),
            prevent_self_review: self.prevent_self_review,
            deployment_branch_policy: self.deployment_branch_policy,
        }
    }
}

/// Parses a deployment branch policy given as JSON.
pub fn parse_branch_policy(value: &str) -> Result<DeploymentBranchPolicy, String> {
    serde_json::from_str(value).map_err(|e| format!("invalid deployment branch policy: {}", e))
}

/// Reads the current configuration of an environment.
///
/// A missing environment is not an error: the outputs report `nochange` and an empty
/// `environment` object.
///
/// # Errors
///
/// Returns `Error::GitHub` for any failure other than a missing environment.
#[instrument(skip(client), fields(repository = %repository))]
pub async fn get(
    name: &str,
    client: Arc<dyn EnvironmentClient>,
    repository: RepositoryIdentity,
) -> Result<Outputs, Error> {
    let remote = match client
        .get_environment(repository.owner(), repository.repo(), name)
        .await
    {
        Ok(remote) => remote,
        Err(e) if is_not_found(&e) => None,
        Err(e) => return Err(e.into()),
    };

    let Some(remote) = remote else {
        let mut outputs =
            Outputs::status("nochange", format!("Environment '{}' does not exist", name));
        outputs.set("environment", "{}");
        return Ok(outputs);
    };

    let mut outputs = Outputs::status(
        "success",
        format!("Successfully retrieved environment '{}'", name),
    );
    outputs.set(
        "environment",
        serde_json::to_string(&remote).unwrap_or_else(|_| "{}".to_string()),
    );
    Ok(outputs)
}

/// Deletes an environment if it exists.
///
/// # Errors
///
/// Returns `Error::Reconcile` if the existence check or the deletion fails.
#[instrument(skip(client), fields(repository = %repository))]
pub async fn delete(
    name: &str,
    client: Arc<dyn EnvironmentClient>,
    repository: RepositoryIdentity,
) -> Result<Outputs, Error> {
    let applier = EnvironmentApplier::new(client, repository);
    let outcome = applier.delete(name).await?;

    info!("{}", outcome.message);
    Ok(Outputs::from(&outcome))
}

/// Creates or updates one environment from the command line arguments.
///
/// # Errors
///
/// Returns `Error::Reconcile` if reviewer resolution, planning or the update fails.
#[instrument(skip(args, client), fields(environment = %args.name, repository = %repository))]
pub async fn configure(
    args: &ConfigureArgs,
    client: Arc<dyn EnvironmentClient>,
    repository: RepositoryIdentity,
) -> Result<Outputs, Error> {
    let spec = args.to_spec();

    let reviewers = match &spec.reviewers {
        Some(entries) => {
            let reconciler = ReviewerReconciler::new(client.clone(), repository.clone());
            reconciler.resolve(&args.name, entries).await?.reviewers
        }
        None => Vec::new(),
    };

    let applier = EnvironmentApplier::new(client, repository);
    let outcome = applier
        .configure(&args.name, &spec.to_config(Some(reviewers)))
        .await?;

    info!("{}", outcome.message);
    Ok(Outputs::from(&outcome))
}
