//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when interacting with the GitHub API
//! through the github_client crate. GitHub's own error message is kept verbatim because
//! callers classify failures (for instance "Not Found") by inspecting the message text.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.get_environment("owner", "repo", "production").await {
///     Ok(env) => println!("Environment: {:?}", env),
///     Err(Error::ApiError { status: Some(404), .. }) => eprintln!("No such environment"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A GitHub API request failed.
    ///
    /// The message is the text GitHub returned (for example `Not Found`), or the
    /// transport error description when the request never produced a GitHub error body.
    /// The status is present when GitHub answered with an HTTP error status.
    #[error("{message}")]
    ApiError {
        /// Human readable error message.
        message: String,
        /// HTTP status code, if one was received.
        status: Option<u16>,
    },

    /// Authentication or GitHub client initialization failure.
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// A request could not be constructed from the given arguments.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Creates an API error with an optional HTTP status.
    pub fn api(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::ApiError {
            message: message.into(),
            status,
        }
    }

    /// Returns the HTTP status code attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => *status,
            _ => None,
        }
    }
}
