//! # Models
//!
//! This module contains the wire models for the deployment environment endpoints of
//! the GitHub REST API.
//!
//! Two reviewer shapes exist. Reading an environment yields protection rules whose
//! reviewers nest the account under a `reviewer` key ([`RawReviewer`]), while creating or
//! updating an environment takes a flat list ([`Reviewer`]).

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// The kind of account that can review a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ReviewerType {
    /// A single GitHub user.
    User,
    /// A team in the repository owner's organization.
    Team,
}

impl ReviewerType {
    /// The wire name of the reviewer type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewerType::User => "User",
            ReviewerType::Team => "Team",
        }
    }
}

impl std::fmt::Display for ReviewerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reviewer in the flat shape used when creating or updating an environment.
///
/// Only `login` is meaningful for users and only `slug` for teams. The `id` is
/// filled once the reviewer has been resolved against GitHub.
///
/// # Examples
///
/// ```
/// use github_client::models::{Reviewer, ReviewerType};
///
/// let reviewer = Reviewer::user(42, "alice");
/// assert_eq!(reviewer.reviewer_type, ReviewerType::User);
/// assert_eq!(reviewer.login.as_deref(), Some("alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Reviewer {
    #[serde(rename = "type")]
    pub reviewer_type: ReviewerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl Reviewer {
    /// Creates a resolved user reviewer.
    pub fn user(id: u64, login: impl Into<String>) -> Self {
        Self {
            reviewer_type: ReviewerType::User,
            id: Some(id),
            login: Some(login.into()),
            slug: None,
        }
    }

    /// Creates a resolved team reviewer.
    pub fn team(id: u64, slug: impl Into<String>) -> Self {
        Self {
            reviewer_type: ReviewerType::Team,
            id: Some(id),
            login: None,
            slug: Some(slug.into()),
        }
    }

    /// The login for users or the slug for teams.
    pub fn handle(&self) -> Option<&str> {
        match self.reviewer_type {
            ReviewerType::User => self.login.as_deref(),
            ReviewerType::Team => self.slug.as_deref(),
        }
    }
}

/// The account nested inside a [`RawReviewer`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReviewerAccount {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// A reviewer as reported inside a `required_reviewers` protection rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawReviewer {
    #[serde(rename = "type")]
    pub reviewer_type: ReviewerType,
    pub reviewer: ReviewerAccount,
}

impl From<&RawReviewer> for Reviewer {
    fn from(value: &RawReviewer) -> Self {
        Self {
            reviewer_type: value.reviewer_type,
            id: Some(value.reviewer.id),
            login: value.reviewer.login.clone(),
            slug: value.reviewer.slug.clone(),
        }
    }
}

/// A protection rule attached to an environment.
///
/// Rules are tagged by their `type` field. Tags this client does not know about
/// (for example `branch_policy`) deserialize to [`ProtectionRule::Unknown`] so that
/// their fields are never read as one of the known rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtectionRule {
    WaitTimer {
        #[serde(default)]
        wait_timer: Option<u32>,
    },
    PreventSelfReview {
        #[serde(default)]
        prevent_self_review: Option<bool>,
    },
    RequiredReviewers {
        #[serde(default)]
        prevent_self_review: Option<bool>,
        #[serde(default)]
        reviewers: Option<Vec<RawReviewer>>,
    },
    #[serde(other)]
    Unknown,
}

/// Branch restrictions for deployments to an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeploymentBranchPolicy {
    pub protected_branches: bool,
    pub custom_branch_policies: bool,
}

/// A deployment environment as returned by `GET /repos/{owner}/{repo}/environments/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Environment {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub protection_rules: Option<Vec<ProtectionRule>>,
    #[serde(default)]
    pub deployment_branch_policy: Option<DeploymentBranchPolicy>,
    /// Remaining fields of the record, such as `url`, `html_url` and the timestamps.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl Environment {
    /// Returns the protection rules, treating a missing list as empty.
    pub fn rules(&self) -> &[ProtectionRule] {
        self.protection_rules.as_deref().unwrap_or_default()
    }

    /// The wait timer from the first `wait_timer` rule, if any.
    pub fn wait_timer(&self) -> Option<u32> {
        self.rules()
            .iter()
            .find_map(|rule| match rule {
                ProtectionRule::WaitTimer { wait_timer } => Some(*wait_timer),
                _ => None,
            })
            .flatten()
    }

    /// The `(reviewers, prevent_self_review)` pair from the first `required_reviewers` rule.
    ///
    /// Returns `None` when the environment has no such rule.
    pub fn required_reviewers(&self) -> Option<(Option<&[RawReviewer]>, Option<bool>)> {
        self.rules().iter().find_map(|rule| match rule {
            ProtectionRule::RequiredReviewers {
                prevent_self_review,
                reviewers,
            } => Some((reviewers.as_deref(), *prevent_self_review)),
            _ => None,
        })
    }
}

/// A single entry of the environment listing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvironmentSummary {
    pub name: String,
}

/// One page of `GET /repos/{owner}/{repo}/environments`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvironmentPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub environments: Vec<EnvironmentSummary>,
}

/// The body of `PUT /repos/{owner}/{repo}/environments/{name}`.
///
/// Absent fields are left out of the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnvironmentUpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_timer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_self_review: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewers: Option<Vec<Reviewer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_branch_policy: Option<DeploymentBranchPolicy>,
}

/// A repository a team has been granted access to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeamRepository {
    pub full_name: String,
}
