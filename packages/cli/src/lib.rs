//! # hybridfs-cli
//!
//! Command-line access to a hybridfs mount table.
//!
//! ```bash
//! hybridfs --config mounts.json mounts
//! hybridfs put scratch/notes.txt --text "hello"
//! hybridfs mv scratch/notes.txt notes.txt
//! hybridfs get notes.txt
//! ```

pub mod commands;
pub mod config;
pub mod error;

pub use commands::{execute, Command};
pub use error::CliError;

use std::path::Path;

/// Load the mount table, run one command and return its printable output.
pub fn run(config: Option<&Path>, command: &Command) -> Result<Option<String>, CliError> {
    let router = config::build_router(&config::load(config)?)?;
    match execute(&router, command)? {
        Some(value) => Ok(Some(serde_json::to_string_pretty(&value)?)),
        None => Ok(None),
    }
}
