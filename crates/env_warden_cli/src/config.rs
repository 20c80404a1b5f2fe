//! Inputs shared by all EnvWarden commands.
//!
//! Every input can be given on the command line or through the environment variables
//! that a CI workflow provides. The token is looked up in this order:
//!
//! 1. `--token`
//! 2. `GH_ENV_CONFIG_TOKEN`
//! 3. `GITHUB_TOKEN`

use std::env;
use std::sync::Arc;

use clap::Args;
use env_warden_core::RepositoryIdentity;
use github_client::{create_token_client, EnvironmentClient, GitHubClient};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::errors::Error;

/// Fallback environment variable for the token.
pub const FALLBACK_TOKEN_VARIABLE: &str = "GITHUB_TOKEN";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Connection arguments accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// GitHub token with administration rights on the repository.
    #[arg(long, global = true, env = "GH_ENV_CONFIG_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository to reconcile, in `owner/repo` form.
    #[arg(long, global = true, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,
}

/// Validated connection settings.
#[derive(Debug)]
pub struct Settings {
    pub token: SecretString,
    pub repository: RepositoryIdentity,
}

impl Settings {
    /// Resolves the settings from the arguments, falling back to `GITHUB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no token is available or the repository is missing,
    /// and `Error::Reconcile` if the repository is not in `owner/repo` form.
    pub fn from_args(args: &ConnectionArgs) -> Result<Self, Error> {
        Self::resolve(args, env::var(FALLBACK_TOKEN_VARIABLE).ok())
    }

    fn resolve(args: &ConnectionArgs, fallback_token: Option<String>) -> Result<Self, Error> {
        let token = args
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| fallback_token.filter(|t| !t.trim().is_empty()))
            .ok_or_else(|| Error::Config("No token provided".to_string()))?;

        let repository = args
            .repository
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "Repository is required: pass --repository or set GITHUB_REPOSITORY"
                        .to_string(),
                )
            })?
            .parse::<RepositoryIdentity>()?;

        debug!(repository = %repository, "Resolved connection settings");
        Ok(Self {
            token: SecretString::from(token),
            repository,
        })
    }

    /// Builds an authenticated GitHub client.
    ///
    /// # Errors
    ///
    /// Returns `Error::GitHub` if the client cannot be created.
    pub fn client(&self) -> Result<Arc<dyn EnvironmentClient>, Error> {
        let octocrab = create_token_client(self.token.expose_secret())?;
        Ok(Arc::new(GitHubClient::new(octocrab)))
    }
}
