//! The comparable configuration of an environment.
//!
//! [`EnvironmentConfig`] describes either the desired or the current state of an
//! environment. Reviewers read from GitHub arrive nested inside a protection rule while
//! desired reviewers are flat; both end up as [`NormalizedReviewer`] lists before they are
//! compared.

use std::cmp::Ordering;

use github_client::models::{
    DeploymentBranchPolicy, Environment, EnvironmentUpdatePayload, Reviewer, ReviewerType,
};
use serde::Serialize;

#[cfg(test)]
#[path = "environment_config_tests.rs"]
mod tests;

/// Protection settings of an environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_timer: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewers: Option<Vec<Reviewer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevent_self_review: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_branch_policy: Option<DeploymentBranchPolicy>,
}

impl EnvironmentConfig {
    /// Extracts the current configuration from an environment read from GitHub.
    ///
    /// `reviewers` and `prevent_self_review` come from the `required_reviewers` rule and
    /// are absent when the environment has no such rule.
    pub fn from_remote(environment: &Environment) -> Self {
        let (reviewers, prevent_self_review) = match environment.required_reviewers() {
            Some((raw, prevent_self_review)) => (
                raw.map(|raw| raw.iter().map(Reviewer::from).collect()),
                prevent_self_review,
            ),
            None => (None, None),
        };

        Self {
            wait_timer: environment.wait_timer(),
            reviewers,
            prevent_self_review,
            deployment_branch_policy: environment.deployment_branch_policy,
        }
    }

    /// Builds the body of the create or update call.
    pub fn to_payload(&self) -> EnvironmentUpdatePayload {
        EnvironmentUpdatePayload {
            wait_timer: self.wait_timer,
            prevent_self_review: self.prevent_self_review,
            reviewers: self.reviewers.as_ref().map(|reviewers| {
                reviewers
                    .iter()
                    .map(|r| {
                        let normalized = NormalizedReviewer::from(r);
                        Reviewer {
                            reviewer_type: normalized.reviewer_type,
                            id: normalized.id,
                            login: normalized.login,
                            slug: normalized.slug,
                        }
                    })
                    .collect()
            }),
            deployment_branch_policy: self.deployment_branch_policy,
        }
    }
}

/// A reviewer reduced to the fields that identify it.
///
/// Users keep only their login and teams only their slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedReviewer {
    #[serde(rename = "type")]
    pub reviewer_type: ReviewerType,
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl From<&Reviewer> for NormalizedReviewer {
    fn from(value: &Reviewer) -> Self {
        let (login, slug) = match value.reviewer_type {
            ReviewerType::User => (value.login.clone(), None),
            ReviewerType::Team => (None, value.slug.clone()),
        };
        Self {
            reviewer_type: value.reviewer_type,
            id: value.id,
            login,
            slug,
        }
    }
}

impl NormalizedReviewer {
    fn sort_key(&self) -> &str {
        match self.reviewer_type {
            ReviewerType::User => self.login.as_deref().unwrap_or(""),
            ReviewerType::Team => self.slug.as_deref().unwrap_or(""),
        }
    }

    /// Orders by type name ("Team" before "User"), then by login or slug.
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.reviewer_type
            .as_str()
            .cmp(other.reviewer_type.as_str())
            .then_with(|| self.sort_key().cmp(other.sort_key()))
    }
}

/// Normalizes and sorts a reviewer list into its canonical form.
///
/// A missing list normalizes to an empty one.
pub fn normalize_reviewers(reviewers: Option<&[Reviewer]>) -> Vec<NormalizedReviewer> {
    let mut normalized: Vec<NormalizedReviewer> = reviewers
        .unwrap_or_default()
        .iter()
        .map(NormalizedReviewer::from)
        .collect();
    normalized.sort_by(NormalizedReviewer::canonical_cmp);
    normalized
}
