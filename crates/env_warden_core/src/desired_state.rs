//! The desired-state document.
//!
//! The document is YAML with a single top-level `environments` mapping from
//! environment name to its settings:
//!
//! ```yaml
//! environments:
//!   production:
//!     wait_timer: 30
//!     prevent_self_review: true
//!     reviewers:
//!       - type: Team
//!         slug: release-managers
//!       - type: User
//!         login: octocat
//!     deployment_branch_policy:
//!       protected_branches: true
//!       custom_branch_policies: false
//!   staging: {}
//! ```
//!
//! Reviewer entries are kept loosely typed so that one malformed entry is reported
//! and skipped instead of rejecting the whole document.

use std::fmt;
use std::fs;
use std::path::Path;

use github_client::models::{DeploymentBranchPolicy, Reviewer};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::{EnvWardenError, EnvWardenResult, EnvironmentConfig};

#[cfg(test)]
#[path = "desired_state_tests.rs"]
mod tests;

/// Default location of the desired-state document.
pub const DEFAULT_CONFIG_PATH: &str = ".github/environments.yaml";

/// A structured reviewer record as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReviewerRecord {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub reviewer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// One reviewer entry of the document, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ReviewerEntry {
    /// A `user:<login>` or `team:<slug>` reference.
    Reference(String),
    /// A `{type, login|slug}` record.
    Record(ReviewerRecord),
    /// Anything else; always invalid.
    Other(serde_json::Value),
}

/// A validated, unresolved reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewerRef {
    User(String),
    Team(String),
}

/// Why a reviewer entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReviewerReason {
    NotAnObject,
    UnknownType,
    MissingLogin,
    MissingSlug,
    MissingId,
}

impl fmt::Display for InvalidReviewerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InvalidReviewerReason::NotAnObject => "not an object",
            InvalidReviewerReason::UnknownType => "type must be User or Team",
            InvalidReviewerReason::MissingLogin => "user reviewer has no login",
            InvalidReviewerReason::MissingSlug => "team reviewer has no slug",
            InvalidReviewerReason::MissingId => "team has no id",
        };
        f.write_str(text)
    }
}

impl ReviewerEntry {
    /// Creates a structured user entry.
    pub fn user(login: impl Into<String>) -> Self {
        Self::Record(ReviewerRecord {
            reviewer_type: Some("User".to_string()),
            login: Some(login.into()),
            slug: None,
        })
    }

    /// Creates a structured team entry.
    pub fn team(slug: impl Into<String>) -> Self {
        Self::Record(ReviewerRecord {
            reviewer_type: Some("Team".to_string()),
            login: None,
            slug: Some(slug.into()),
        })
    }

    /// Parses a comma separated list of `user:<login>` / `team:<slug>` references.
    pub fn parse_list(text: &str) -> Vec<Self> {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self::Reference(s.to_string()))
            .collect()
    }

    /// Validates the entry.
    pub fn to_reference(&self) -> Result<ReviewerRef, InvalidReviewerReason> {
        match self {
            ReviewerEntry::Reference(text) => {
                if let Some(login) = text.strip_prefix("user:") {
                    non_empty(login)
                        .map(ReviewerRef::User)
                        .ok_or(InvalidReviewerReason::MissingLogin)
                } else if let Some(slug) = text.strip_prefix("team:") {
                    non_empty(slug)
                        .map(ReviewerRef::Team)
                        .ok_or(InvalidReviewerReason::MissingSlug)
                } else {
                    Err(InvalidReviewerReason::NotAnObject)
                }
            }
            ReviewerEntry::Record(record) => match record.reviewer_type.as_deref() {
                Some("User") => record
                    .login
                    .as_deref()
                    .and_then(non_empty)
                    .map(ReviewerRef::User)
                    .ok_or(InvalidReviewerReason::MissingLogin),
                Some("Team") => record
                    .slug
                    .as_deref()
                    .and_then(non_empty)
                    .map(ReviewerRef::Team)
                    .ok_or(InvalidReviewerReason::MissingSlug),
                _ => Err(InvalidReviewerReason::UnknownType),
            },
            // A mapping only lands here when `type`, `login` or `slug` is not a string
            ReviewerEntry::Other(value) if value.is_object() => {
                Err(InvalidReviewerReason::UnknownType)
            }
            ReviewerEntry::Other(_) => Err(InvalidReviewerReason::NotAnObject),
        }
    }

    /// Renders the entry as JSON for diagnostics.
    pub fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// The settings of one environment as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EnvironmentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_timer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewers: Option<Vec<ReviewerEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_self_review: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_branch_policy: Option<DeploymentBranchPolicy>,
}

impl EnvironmentSpec {
    /// Builds the desired configuration once reviewers have been resolved.
    pub fn to_config(&self, reviewers: Option<Vec<Reviewer>>) -> EnvironmentConfig {
        EnvironmentConfig {
            wait_timer: self.wait_timer,
            reviewers,
            prevent_self_review: self.prevent_self_review,
            deployment_branch_policy: self.deployment_branch_policy,
        }
    }
}

/// The parsed desired-state document, with environments in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredState {
    environments: Vec<(String, EnvironmentSpec)>,
}

impl DesiredState {
    /// Creates a desired state from already parsed environments.
    pub fn new(environments: Vec<(String, EnvironmentSpec)>) -> Self {
        Self { environments }
    }

    /// Loads the document from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `EnvWardenError::ConfigLoad` if the file cannot be read, is not valid
    /// YAML, or has no `environments` key.
    pub fn load(path: &Path) -> EnvWardenResult<Self> {
        debug!("Loading desired state from {:?}", path);

        let display = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| EnvWardenError::config_load(&display, e.to_string()))?;

        Self::from_yaml(&content).map_err(|reason| EnvWardenError::config_load(&display, reason))
    }

    /// Parses the document from YAML text.
    ///
    /// An empty list for `environments` is accepted and treated as no environments.
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        let document: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;

        let environments = match document.get("environments") {
            None | Some(Value::Null) => {
                return Err("Invalid configuration: missing \"environments\" key".to_string())
            }
            Some(Value::Sequence(items)) if items.is_empty() => Vec::new(),
            Some(Value::Mapping(mapping)) => {
                let mut environments = Vec::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let name = key.as_str().ok_or_else(|| {
                        format!("Invalid configuration: environment name {:?} is not a string", key)
                    })?;
                    let spec = if value.is_null() {
                        EnvironmentSpec::default()
                    } else {
                        serde_yaml::from_value(value.clone())
                            .map_err(|e| format!("environment '{}': {}", name, e))?
                    };
                    environments.push((name.to_string(), spec));
                }
                environments
            }
            Some(_) => {
                return Err(
                    "Invalid configuration: \"environments\" must be a mapping".to_string()
                )
            }
        };

        Ok(Self { environments })
    }

    /// The environments in document order.
    pub fn environments(&self) -> &[(String, EnvironmentSpec)] {
        &self.environments
    }

    /// Returns true when an environment with this name is described.
    pub fn contains(&self, name: &str) -> bool {
        self.environments.iter().any(|(n, _)| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }
}
