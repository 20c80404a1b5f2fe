//! Command outputs.
//!
//! Outputs are printed as `key=value` lines and, when `GITHUB_OUTPUT` names a file,
//! appended to that file so that later workflow steps can read them.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use env_warden_core::{ApplyOutcome, RunReport};
use tracing::debug;

use crate::errors::Error;

#[cfg(test)]
#[path = "outputs_tests.rs"]
mod tests;

/// Environment variable naming the workflow output file.
pub const GITHUB_OUTPUT_VARIABLE: &str = "GITHUB_OUTPUT";

const FAILURE_STATUS: &str = "failure";

/// Ordered key/value outputs of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs {
    entries: Vec<(String, String)>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates outputs holding only a status and a message.
    pub fn status(status: impl Into<String>, message: impl Into<String>) -> Self {
        let mut outputs = Self::new();
        outputs.set("status", status);
        outputs.set("message", message);
        outputs
    }

    /// Outputs of a command that failed with `error`.
    pub fn failure(error: &Error) -> Self {
        Self::status(FAILURE_STATUS, error.to_string())
    }

    /// Sets a value, replacing any earlier value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true when the `status` output reports a failure.
    pub fn is_failure(&self) -> bool {
        self.get("status") == Some(FAILURE_STATUS)
    }

    /// Renders the outputs in the workflow output file format.
    ///
    /// Values spanning several lines use the heredoc form `key<<DELIMITER`.
    pub fn render(&self) -> String {
        let mut text = String::new();
        for (key, value) in &self.entries {
            if value.contains('\n') {
                let delimiter = heredoc_delimiter(value);
                text.push_str(&format!("{key}<<{delimiter}\n{value}\n{delimiter}\n"));
            } else {
                text.push_str(&format!("{key}={value}\n"));
            }
        }
        text
    }

    /// Appends the outputs to the given file, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::WriteOutputs` if the file cannot be opened or written.
    pub fn append_to(&self, path: &Path) -> Result<(), Error> {
        let write_error = |source| Error::WriteOutputs {
            path: path.display().to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(write_error)?;
        file.write_all(self.render().as_bytes())
            .map_err(write_error)?;

        debug!("Wrote {} outputs to {:?}", self.entries.len(), path);
        Ok(())
    }

    /// Appends the outputs to the file named by `GITHUB_OUTPUT`, if set.
    ///
    /// # Errors
    ///
    /// Returns `Error::WriteOutputs` if the file cannot be written.
    pub fn write_github_output(&self) -> Result<(), Error> {
        match env::var_os(GITHUB_OUTPUT_VARIABLE) {
            Some(path) if !path.is_empty() => self.append_to(Path::new(&path)),
            _ => Ok(()),
        }
    }
}

impl From<&RunReport> for Outputs {
    fn from(report: &RunReport) -> Self {
        Self::status(report.status.to_string(), report.message.clone())
    }
}

impl From<&ApplyOutcome> for Outputs {
    fn from(outcome: &ApplyOutcome) -> Self {
        Self::status(outcome.status.as_str(), outcome.message.clone())
    }
}

fn heredoc_delimiter(value: &str) -> String {
    let mut delimiter = String::from("ENV_WARDEN_EOF");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    delimiter
}
