//! Crate for interacting with the GitHub REST API.
//!
//! This crate provides a client for the deployment environment endpoints of a
//! repository, together with the user and team lookups needed to resolve
//! environment reviewers. All calls go through the [`EnvironmentClient`] trait so that
//! consumers can substitute their own implementation in tests.

use async_trait::async_trait;
use octocrab::{Octocrab, Result as OctocrabResult};
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod models;

mod user;
pub use user::{Team, User};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Page size used for all paginated listings.
const PAGE_SIZE: usize = 100;

#[derive(Debug, Serialize)]
struct PageParameters {
    per_page: usize,
    page: u32,
}

/// A client for interacting with the GitHub API.
#[derive(Debug)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` from an already configured `Octocrab` instance.
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

/// The GitHub operations needed to reconcile deployment environments.
///
/// Every method maps to exactly one REST endpoint (or a paginated series of calls to
/// one endpoint). Errors carry GitHub's message verbatim; a missing resource shows up
/// as an [`Error::ApiError`] whose message contains `Not Found`.
#[async_trait]
pub trait EnvironmentClient: Send + Sync {
    /// Fetches a single environment.
    ///
    /// Returns `Ok(None)` when GitHub answers successfully with a `null` body.
    async fn get_environment(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<Option<models::Environment>, Error>;

    /// Creates the environment, or replaces its protection settings when it exists.
    async fn create_or_update_environment(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        payload: &models::EnvironmentUpdatePayload,
    ) -> Result<(), Error>;

    /// Deletes an environment.
    async fn delete_environment(&self, owner: &str, repo: &str, name: &str) -> Result<(), Error>;

    /// Lists the names of all environments in the repository.
    async fn list_environments(&self, owner: &str, repo: &str) -> Result<Vec<String>, Error>;

    /// Looks up a user by their exact login.
    async fn get_user_by_username(&self, username: &str) -> Result<User, Error>;

    /// Looks up a team by slug within an organization.
    async fn get_team_by_slug(&self, org: &str, slug: &str) -> Result<Team, Error>;

    /// Lists the repositories a team has access to.
    async fn list_team_repositories(
        &self,
        org: &str,
        slug: &str,
    ) -> Result<Vec<models::TeamRepository>, Error>;
}

#[async_trait]
impl EnvironmentClient for GitHubClient {
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, environment = %name))]
    async fn get_environment(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<Option<models::Environment>, Error> {
        let path = api_path(&["repos", owner, repo, "environments", name])?;

        debug!("Making API call to: {}", path);
        let response: OctocrabResult<Option<models::Environment>> =
            self.client.get(&path, None::<&()>).await;

        response.map_err(|e| map_octocrab_error("Failed to get environment", e))
    }

    #[instrument(skip(self, payload), fields(owner = %owner, repo = %repo, environment = %name))]
    async fn create_or_update_environment(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        payload: &models::EnvironmentUpdatePayload,
    ) -> Result<(), Error> {
        let path = api_path(&["repos", owner, repo, "environments", name])?;

        let response: OctocrabResult<serde_json::Value> =
            self.client.put(&path, Some(payload)).await;
        match response {
            Ok(_) => {
                info!("Environment created or updated");
                Ok(())
            }
            Err(e) => Err(map_octocrab_error(
                "Failed to create or update environment",
                e,
            )),
        }
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo, environment = %name))]
    async fn delete_environment(&self, owner: &str, repo: &str, name: &str) -> Result<(), Error> {
        let path = api_path(&["repos", owner, repo, "environments", name])?;

        let response = self
            .client
            ._delete(path.as_str(), None::<&()>)
            .await
            .map_err(|e| map_octocrab_error("Failed to delete environment", e))?;

        octocrab::map_github_error(response)
            .await
            .map(drop)
            .map_err(|e| map_octocrab_error("Failed to delete environment", e))?;

        info!("Environment deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn list_environments(&self, owner: &str, repo: &str) -> Result<Vec<String>, Error> {
        let path = api_path(&["repos", owner, repo, "environments"])?;

        let mut names = Vec::new();
        let mut page = 1;
        loop {
            let parameters = PageParameters {
                per_page: PAGE_SIZE,
                page,
            };
            let response: OctocrabResult<models::EnvironmentPage> =
                self.client.get(&path, Some(&parameters)).await;
            let environments =
                response.map_err(|e| map_octocrab_error("Failed to list environments", e))?;

            let received = environments.environments.len();
            names.extend(environments.environments.into_iter().map(|e| e.name));

            if received < PAGE_SIZE || names.len() as u64 >= environments.total_count {
                break;
            }
            page += 1;
        }

        debug!(count = names.len(), "Listed environments");
        Ok(names)
    }

    #[instrument(skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<User, Error> {
        let path = api_path(&["users", username])?;

        let response: OctocrabResult<User> = self.client.get(&path, None::<&()>).await;
        response.map_err(|e| map_octocrab_error("Failed to get user", e))
    }

    #[instrument(skip(self))]
    async fn get_team_by_slug(&self, org: &str, slug: &str) -> Result<Team, Error> {
        let path = api_path(&["orgs", org, "teams", slug])?;

        let response: OctocrabResult<Team> = self.client.get(&path, None::<&()>).await;
        response.map_err(|e| map_octocrab_error("Failed to get team", e))
    }

    #[instrument(skip(self))]
    async fn list_team_repositories(
        &self,
        org: &str,
        slug: &str,
    ) -> Result<Vec<models::TeamRepository>, Error> {
        let path = api_path(&["orgs", org, "teams", slug, "repos"])?;

        let mut repositories = Vec::new();
        let mut page = 1;
        loop {
            let parameters = PageParameters {
                per_page: PAGE_SIZE,
                page,
            };
            let response: OctocrabResult<Vec<models::TeamRepository>> =
                self.client.get(&path, Some(&parameters)).await;
            let batch =
                response.map_err(|e| map_octocrab_error("Failed to list team repositories", e))?;

            let received = batch.len();
            repositories.extend(batch);

            if received < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(repositories)
    }
}

/// Creates an `Octocrab` client authenticated with a personal access token.
///
/// # Errors
///
/// Returns an `Error::AuthError` if the token is empty or the client cannot be built.
#[instrument(skip(token))]
pub fn create_token_client(token: &str) -> Result<Octocrab, Error> {
    if token.trim().is_empty() {
        return Err(Error::AuthError("Token is required".to_string()));
    }

    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| {
            error!(error = ?e, "Failed to build Octocrab client with personal token");
            Error::AuthError(e.to_string())
        })
}

/// Builds a request path from raw segments, percent-encoding each one.
fn api_path(segments: &[&str]) -> Result<String, Error> {
    if let Some(position) = segments.iter().position(|s| s.is_empty()) {
        return Err(Error::InvalidRequest(format!(
            "path segment {} is empty",
            position
        )));
    }

    let mut url = Url::parse("https://api.github.com/")
        .map_err(|e| Error::InvalidRequest(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::InvalidRequest("cannot build request path".to_string()))?
        .clear()
        .extend(segments);

    Ok(url.path().to_string())
}

/// Logs an octocrab error and converts it into the crate's error type.
///
/// GitHub errors keep their message and status. A `404` is logged at debug level
/// because callers routinely use it to detect missing resources.
fn map_octocrab_error(message: &str, e: octocrab::Error) -> Error {
    match e {
        octocrab::Error::GitHub { source, backtrace } => {
            let status = source.status_code.as_u16();
            if status == 404 {
                debug!(
                    error_message = %source.message,
                    status,
                    "{}. Resource was not found",
                    message
                );
            } else {
                error!(
                    error_message = %source.message,
                    status,
                    backtrace = %backtrace,
                    "{}. Received an error from GitHub",
                    message
                );
            }
            Error::api(source.message.clone(), Some(status))
        }
        octocrab::Error::UriParse { source, backtrace } => {
            error!(
                error_message = %source,
                backtrace = %backtrace,
                "{}. Failed to parse URI.",
                message
            );
            Error::InvalidRequest(source.to_string())
        }
        octocrab::Error::Uri { source, backtrace } => {
            error!(
                error_message = %source,
                backtrace = %backtrace,
                "{}, Failed to parse URI.",
                message
            );
            Error::InvalidRequest(source.to_string())
        }
        _ => {
            error!(error_message = %e, "{}", message);
            Error::api(e.to_string(), None)
        }
    }
}
