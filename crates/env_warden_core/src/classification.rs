//! Classification of GitHub errors.
//!
//! GitHub reports a missing resource with a message containing `Not Found`, and that
//! substring is the only existence check used anywhere in this crate. All string
//! matching on error messages lives here so that call sites only ask questions such as
//! [`is_not_found`].

use github_client::Error;

#[cfg(test)]
#[path = "classification_tests.rs"]
mod tests;

/// Substring GitHub uses in the message of a missing resource.
pub const NOT_FOUND_MARKER: &str = "Not Found";

/// Message of a bare API failure, treated as a team access failure.
pub const API_ERROR_SENTINEL: &str = "API Error";

/// Message fragments that mark a team as missing or inaccessible.
const ACCESS_FAILURE_PATTERNS: [&str; 4] = [
    "does not have access",
    NOT_FOUND_MARKER,
    "Resource not accessible by integration",
    "Not Found or access denied",
];

/// HTTP statuses that mark a team as missing or inaccessible.
const ACCESS_FAILURE_STATUSES: [u16; 2] = [404, 403];

/// Returns true when the error means the requested resource does not exist.
pub fn is_not_found(error: &Error) -> bool {
    error.to_string().contains(NOT_FOUND_MARKER)
}

/// Returns true when a failure while resolving a team means the team cannot be used
/// for this repository, as opposed to an unexpected failure.
pub fn is_team_access_failure(error: &Error) -> bool {
    let message = error.to_string();

    if message == API_ERROR_SENTINEL {
        return true;
    }

    if error
        .status()
        .is_some_and(|status| ACCESS_FAILURE_STATUSES.contains(&status))
    {
        return true;
    }

    ACCESS_FAILURE_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
}
