//! Reconciles every environment of the repository with the desired-state document.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use env_warden_core::{
    DesiredState, Orchestrator, RepositoryIdentity, RunOptions, DEFAULT_CONFIG_PATH,
};
use github_client::EnvironmentClient;
use tracing::{debug, instrument};

use crate::errors::Error;
use crate::outputs::Outputs;

#[cfg(test)]
#[path = "sync_cmd_tests.rs"]
mod tests;

/// Arguments of the `sync` command.
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Path of the desired-state document.
    #[arg(long, env = "INPUT_CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,

    /// Log the changes without making them.
    #[arg(long, env = "INPUT_DRY_RUN")]
    pub dry_run: bool,
}

/// Loads the document and reconciles the repository against it.
///
/// # Errors
///
/// Returns `Error::Reconcile` if the document cannot be loaded. Failures during the
/// run itself are reported through the `status` and `message` outputs.
#[instrument(skip(client), fields(repository = %repository))]
pub async fn execute(
    args: &SyncArgs,
    client: Arc<dyn EnvironmentClient>,
    repository: RepositoryIdentity,
) -> Result<Outputs, Error> {
    let desired = DesiredState::load(&args.config_path)?;
    debug!(environments = desired.len(), "Loaded desired state");

    let orchestrator = Orchestrator::new(client, repository);
    let report = orchestrator
        .run(
            &desired,
            &RunOptions {
                dry_run: args.dry_run,
            },
        )
        .await;

    Ok(Outputs::from(&report))
}
