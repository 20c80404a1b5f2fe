//! Command modules for the EnvWarden CLI.
//!
//! - `sync_cmd`: Reconciles all environments against the desired-state document
//! - `environment_cmd`: Reads, deletes or configures a single environment

pub mod environment_cmd;
pub mod sync_cmd;
