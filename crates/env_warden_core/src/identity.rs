//! Resolution of reviewer references into GitHub identities.

use std::sync::Arc;

use github_client::models::{Reviewer, ReviewerType};
use github_client::EnvironmentClient;
use tracing::{debug, instrument};

use crate::RepositoryIdentity;

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;

/// Looks up users and teams for the repository being reconciled.
///
/// Teams are always looked up in the organization that owns the repository.
pub struct IdentityResolver {
    client: Arc<dyn EnvironmentClient>,
    repository: RepositoryIdentity,
}

impl IdentityResolver {
    pub fn new(client: Arc<dyn EnvironmentClient>, repository: RepositoryIdentity) -> Self {
        Self { client, repository }
    }

    /// Resolves a user by exact login.
    ///
    /// # Errors
    ///
    /// Lookup failures, including a missing user, are returned unchanged.
    #[instrument(skip(self))]
    pub async fn resolve_user(&self, login: &str) -> Result<Reviewer, github_client::Error> {
        let user = self.client.get_user_by_username(login).await?;
        Ok(Reviewer::user(user.id, user.login))
    }

    /// Resolves a team by slug.
    ///
    /// A team reported without an id resolves to a reviewer whose `id` is `None`.
    ///
    /// # Errors
    ///
    /// Lookup failures, including a missing team, are returned unchanged.
    #[instrument(skip(self))]
    pub async fn resolve_team(&self, slug: &str) -> Result<Reviewer, github_client::Error> {
        let team = self
            .client
            .get_team_by_slug(self.repository.owner(), slug)
            .await?;

        Ok(Reviewer {
            reviewer_type: ReviewerType::Team,
            id: (team.id != 0).then_some(team.id),
            login: None,
            slug: Some(team.slug),
        })
    }

    /// Returns true when the team has been granted access to the repository.
    ///
    /// Any failure while listing the team's repositories counts as no access.
    #[instrument(skip(self))]
    pub async fn has_team_access(&self, slug: &str) -> bool {
        let full_name = self.repository.to_string();
        match self
            .client
            .list_team_repositories(self.repository.owner(), slug)
            .await
        {
            Ok(repositories) => repositories.iter().any(|r| r.full_name == full_name),
            Err(e) => {
                debug!(error = %e, "Could not list repositories of team {}", slug);
                false
            }
        }
    }
}
