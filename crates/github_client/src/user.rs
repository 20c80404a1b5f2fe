//! Directory account types.
//!
//! This module contains the types returned when looking up the users and teams
//! that can be configured as deployment reviewers.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;

/// Represents a GitHub user account.
///
/// # Examples
///
/// ```rust
/// use github_client::User;
///
/// let user = User {
///     id: 12345,
///     login: "octocat".to_string(),
/// };
///
/// println!("User: {} (ID: {})", user.login, user.id);
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct User {
    /// The unique numeric ID of the user
    pub id: u64,
    /// The login name of the user
    pub login: String,
}

/// Represents a team within an organization.
///
/// GitHub always sends an `id`, but a missing one deserializes to `0` so that
/// callers can reject the record instead of failing the whole response.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Team {
    /// The unique numeric ID of the team, `0` when absent
    #[serde(default)]
    pub id: u64,
    /// The URL friendly name of the team
    pub slug: String,
    /// The display name of the team
    #[serde(default)]
    pub name: Option<String>,
}
