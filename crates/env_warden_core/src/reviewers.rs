//! Resolution of the desired reviewers of an environment.
//!
//! Problems with individual reviewers are isolated: an entry with the wrong shape, a
//! user that cannot be found or a team without access to the repository is reported
//! and skipped while the remaining entries are still resolved. The one exception is a
//! team lookup failing for a reason that does not look like missing access, which
//! aborts resolution. User lookup failures never do.

use std::fmt;
use std::sync::Arc;

use github_client::models::Reviewer;
use github_client::EnvironmentClient;
use tracing::{debug, error, instrument};

use crate::classification::is_team_access_failure;
use crate::{
    EnvWardenResult, EnvironmentConfig, IdentityResolver, InvalidReviewerReason, RepositoryIdentity,
    ReviewerEntry, ReviewerRef,
};

#[cfg(test)]
#[path = "reviewers_tests.rs"]
mod tests;

/// A problem found while resolving one reviewer, or the summary of failed teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewerDiagnostic {
    /// The entry does not describe a user or a team.
    InvalidReviewer {
        repository: String,
        entry: String,
        reason: InvalidReviewerReason,
    },
    /// The user could not be looked up.
    UserLookupFailed {
        repository: String,
        entry: String,
        message: String,
    },
    /// The team exists but has not been granted access to the repository.
    TeamWithoutAccess { slug: String, repository: String },
    /// The team lookup failed in a way that indicates missing access.
    TeamLookupFailed { slug: String, message: String },
    /// Summary of every team that could not be added.
    FailedTeams {
        repository: String,
        slugs: Vec<String>,
    },
}

impl fmt::Display for ReviewerDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewerDiagnostic::InvalidReviewer {
                repository,
                entry,
                reason: InvalidReviewerReason::UnknownType,
            } => write!(f, "Invalid reviewer type for {}: {}", repository, entry),
            ReviewerDiagnostic::InvalidReviewer {
                repository, entry, ..
            } => write!(f, "Invalid reviewer format for {}: {}", repository, entry),
            ReviewerDiagnostic::UserLookupFailed {
                repository,
                entry,
                message,
            } => write!(
                f,
                "Failed to process reviewer for {}: {} — {}",
                repository, entry, message
            ),
            ReviewerDiagnostic::TeamWithoutAccess { slug, repository } => write!(
                f,
                "Team {} does not have access to {} repository",
                slug, repository
            ),
            ReviewerDiagnostic::TeamLookupFailed { slug, message } => {
                write!(f, "Error adding team {}: {}", slug, message)
            }
            ReviewerDiagnostic::FailedTeams { repository, slugs } => write!(
                f,
                "The following teams do not have access to {}: {}",
                repository,
                slugs.join(", ")
            ),
        }
    }
}

/// The reviewers that could be resolved and the problems found along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewerResolution {
    /// Resolved reviewers in input order, each with an id and unique by `(type, id)`.
    pub reviewers: Vec<Reviewer>,
    pub diagnostics: Vec<ReviewerDiagnostic>,
}

impl ReviewerResolution {
    /// Slugs of the teams that could not be added.
    pub fn failed_teams(&self) -> &[String] {
        self.diagnostics
            .iter()
            .find_map(|d| match d {
                ReviewerDiagnostic::FailedTeams { slugs, .. } => Some(slugs.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Outcome of resolving a single team entry.
enum TeamResolution {
    Resolved(Reviewer),
    /// Reported as an invalid entry.
    Invalid,
    /// Counted among the teams that could not be added.
    Failed,
}

/// Resolves desired reviewer entries for the environments of one repository.
pub struct ReviewerReconciler {
    client: Arc<dyn EnvironmentClient>,
    resolver: IdentityResolver,
    repository: RepositoryIdentity,
}

impl ReviewerReconciler {
    pub fn new(client: Arc<dyn EnvironmentClient>, repository: RepositoryIdentity) -> Self {
        let resolver = IdentityResolver::new(client.clone(), repository.clone());
        Self {
            client,
            resolver,
            repository,
        }
    }

    /// Resolves the desired reviewers of an environment.
    ///
    /// # Errors
    ///
    /// Returns `EnvWardenError::GitHub` when a team lookup fails for a reason that is not
    /// classified as an access failure.
    #[instrument(skip(self, desired), fields(environment = %environment, count = desired.len()))]
    pub async fn resolve(
        &self,
        environment: &str,
        desired: &[ReviewerEntry],
    ) -> EnvWardenResult<ReviewerResolution> {
        let existing = self.existing_reviewers(environment).await;
        let is_configured = |reviewer: &Reviewer| {
            existing
                .iter()
                .any(|e| e.reviewer_type == reviewer.reviewer_type && e.id == reviewer.id)
        };

        let mut resolution = ReviewerResolution::default();
        let mut failed_teams = Vec::new();

        for entry in desired {
            let reference = match entry.to_reference() {
                Ok(reference) => reference,
                Err(reason) => {
                    self.report(
                        &mut resolution,
                        ReviewerDiagnostic::InvalidReviewer {
                            repository: self.repository.to_string(),
                            entry: entry.describe(),
                            reason,
                        },
                    );
                    continue;
                }
            };

            let reviewer = match reference {
                ReviewerRef::User(login) => match self.resolver.resolve_user(&login).await {
                    Ok(user) => user,
                    Err(e) => {
                        self.report(
                            &mut resolution,
                            ReviewerDiagnostic::UserLookupFailed {
                                repository: self.repository.to_string(),
                                entry: entry.describe(),
                                message: e.to_string(),
                            },
                        );
                        continue;
                    }
                },
                ReviewerRef::Team(slug) => {
                    match self.resolve_team(&slug, entry, &mut resolution).await? {
                        TeamResolution::Resolved(team) => team,
                        TeamResolution::Invalid => continue,
                        TeamResolution::Failed => {
                            failed_teams.push(slug);
                            continue;
                        }
                    }
                }
            };

            debug!(
                "{} {} {}",
                if is_configured(&reviewer) {
                    "Skipping"
                } else {
                    "Adding"
                },
                reviewer.reviewer_type.as_str().to_lowercase(),
                reviewer.handle().unwrap_or_default()
            );

            let duplicate = resolution
                .reviewers
                .iter()
                .any(|r| r.reviewer_type == reviewer.reviewer_type && r.id == reviewer.id);
            if duplicate {
                debug!(
                    "Ignoring duplicate {} {}",
                    reviewer.reviewer_type,
                    reviewer.handle().unwrap_or_default()
                );
                continue;
            }
            resolution.reviewers.push(reviewer);
        }

        if !failed_teams.is_empty() {
            self.report(
                &mut resolution,
                ReviewerDiagnostic::FailedTeams {
                    repository: self.repository.to_string(),
                    slugs: failed_teams,
                },
            );
        }

        Ok(resolution)
    }

    /// Resolves a team and checks its access to the repository.
    async fn resolve_team(
        &self,
        slug: &str,
        entry: &ReviewerEntry,
        resolution: &mut ReviewerResolution,
    ) -> EnvWardenResult<TeamResolution> {
        let team = match self.resolver.resolve_team(slug).await {
            Ok(team) => team,
            Err(e) if is_team_access_failure(&e) => {
                self.report(
                    resolution,
                    ReviewerDiagnostic::TeamLookupFailed {
                        slug: slug.to_string(),
                        message: e.to_string(),
                    },
                );
                return Ok(TeamResolution::Failed);
            }
            Err(e) => {
                error!(
                    error = %e,
                    "Failed to process reviewer for {}: {}",
                    self.repository,
                    entry.describe()
                );
                return Err(e.into());
            }
        };

        if team.id.is_none() {
            self.report(
                resolution,
                ReviewerDiagnostic::InvalidReviewer {
                    repository: self.repository.to_string(),
                    entry: entry.describe(),
                    reason: InvalidReviewerReason::MissingId,
                },
            );
            return Ok(TeamResolution::Invalid);
        }

        if !self.resolver.has_team_access(slug).await {
            self.report(
                resolution,
                ReviewerDiagnostic::TeamWithoutAccess {
                    slug: slug.to_string(),
                    repository: self.repository.to_string(),
                },
            );
            return Ok(TeamResolution::Failed);
        }

        Ok(TeamResolution::Resolved(team))
    }

    /// Reads the reviewers already configured on the environment.
    ///
    /// Any failure, including a missing environment, yields an empty list.
    async fn existing_reviewers(&self, environment: &str) -> Vec<Reviewer> {
        let current = self
            .client
            .get_environment(self.repository.owner(), self.repository.repo(), environment)
            .await;

        match current {
            Ok(Some(remote)) => EnvironmentConfig::from_remote(&remote)
                .reviewers
                .unwrap_or_default(),
            _ => {
                debug!(
                    "Environment {} does not exist yet, skipping existing reviewer check",
                    environment
                );
                Vec::new()
            }
        }
    }

    fn report(&self, resolution: &mut ReviewerResolution, diagnostic: ReviewerDiagnostic) {
        error!(repository = %self.repository, "{}", diagnostic);
        resolution.diagnostics.push(diagnostic);
    }
}
