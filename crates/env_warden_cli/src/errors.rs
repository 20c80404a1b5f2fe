use std::io;

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the EnvWarden CLI application.
///
/// The message of an error ends up in the `message` output, so wrapped errors from the
/// reconciliation crates are displayed without a prefix.
#[derive(Error, Debug)]
pub enum Error {
    /// A required input is missing or has an invalid value.
    ///
    /// This error is returned when the token or repository cannot be determined from
    /// the command line or the environment.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A GitHub API call made directly by the CLI failed.
    #[error(transparent)]
    GitHub(#[from] github_client::Error),

    /// Reconciliation failed.
    #[error(transparent)]
    Reconcile(#[from] env_warden_core::EnvWardenError),

    /// The outputs could not be written to the file named by `GITHUB_OUTPUT`.
    #[error("Failed to write outputs to {path}: {source}")]
    WriteOutputs { path: String, source: io::Error },
}
