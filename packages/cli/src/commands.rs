//! Command parsing and execution.
//!
//! Commands:
//! - `mounts` - List the mount table
//! - `ls [path]` - List a directory
//! - `get <path>` - Show an entry with its content
//! - `put <path> --text S | --file F` - Write a file or notebook
//! - `mkdir <path>` - Create a directory
//! - `rm <path>` - Delete an entry
//! - `mv <old> <new>` - Rename, possibly across mounts
//! - `cp <from> [to]` - Copy a file or notebook
//! - `new [dir]` - Create an untitled entry

use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::Subcommand;
use serde_json::{json, Value as JsonValue};

use hybridfs_contents::{Entry, EntryKind, Format, GetOptions, Path};
use hybridfs_router::Router;

use crate::CliError;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the mount table
    Mounts,

    /// List a directory
    Ls {
        #[arg(default_value = "")]
        path: String,
    },

    /// Show an entry
    Get {
        path: String,
        /// Metadata only
        #[arg(long)]
        no_content: bool,
        /// Require a kind: file, notebook or directory
        #[arg(long = "type")]
        kind: Option<EntryKind>,
        /// Force a content format: text or base64
        #[arg(long)]
        format: Option<Format>,
    },

    /// Write a file or notebook
    Put {
        path: String,
        /// Literal content
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        /// Read content from a local file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Store as an opaque base64 file
        #[arg(long)]
        base64: bool,
    },

    /// Create a directory
    Mkdir { path: String },

    /// Delete an entry
    Rm { path: String },

    /// Rename an entry
    Mv { old: String, new: String },

    /// Copy a file or notebook
    Cp { from: String, to: Option<String> },

    /// Create an untitled entry
    New {
        #[arg(default_value = "")]
        dir: String,
        #[arg(long = "type")]
        kind: Option<EntryKind>,
        /// Extension for new files, e.g. `.txt`
        #[arg(long)]
        ext: Option<String>,
    },
}

/// Run a command. Returns the JSON to print, if any.
pub fn execute(router: &Router, command: &Command) -> Result<Option<JsonValue>, CliError> {
    match command {
        Command::Mounts => {
            let mounts: Vec<JsonValue> = router
                .mounts()
                .map(|m| {
                    json!({
                        "prefix": m.prefix().to_string(),
                        "backend": m.backend().label(),
                    })
                })
                .collect();
            Ok(Some(JsonValue::Array(mounts)))
        }
        Command::Ls { path } => {
            let entries = router.list(path)?;
            Ok(Some(serde_json::to_value(entries)?))
        }
        Command::Get {
            path,
            no_content,
            kind,
            format,
        } => {
            let options = GetOptions {
                content: !no_content,
                kind: *kind,
                format: *format,
            };
            Ok(Some(serde_json::to_value(router.get(path, &options)?)?))
        }
        Command::Put {
            path,
            text,
            file,
            base64,
        } => {
            let bytes = match (text, file) {
                (Some(text), _) => text.clone().into_bytes(),
                (None, Some(file)) => fs::read(file).map_err(|source| CliError::ReadFile {
                    path: file.clone(),
                    source,
                })?,
                (None, None) => {
                    return Err(CliError::InvalidArgument(
                        "one of --text or --file is required".to_string(),
                    ))
                }
            };
            let model = model_for(path, bytes, *base64)?;
            Ok(Some(serde_json::to_value(router.save(&model, path)?)?))
        }
        Command::Mkdir { path } => {
            let entry = router.save(&Entry::directory(Path::root()), path)?;
            Ok(Some(serde_json::to_value(entry)?))
        }
        Command::Rm { path } => {
            router.delete(path)?;
            Ok(None)
        }
        Command::Mv { old, new } => Ok(Some(serde_json::to_value(router.rename(old, new)?)?)),
        Command::Cp { from, to } => Ok(Some(serde_json::to_value(
            router.copy(from, to.as_deref())?,
        )?)),
        Command::New { dir, kind, ext } => Ok(Some(serde_json::to_value(
            router.new_untitled(dir, *kind, ext.as_deref())?,
        )?)),
    }
}

/// Build the save model for raw bytes headed for `path`.
///
/// `.ipynb` targets are parsed as notebooks unless `base64` is set. Other
/// content is text when it is UTF-8, else base64.
fn model_for(path: &str, bytes: Vec<u8>, base64: bool) -> Result<Entry, CliError> {
    if base64 {
        return Ok(Entry::base64_file(Path::root(), BASE64.encode(&bytes)));
    }
    if path.trim_end_matches('/').ends_with(".ipynb") {
        let document: JsonValue = serde_json::from_slice(&bytes)?;
        return Ok(Entry::notebook(Path::root(), document));
    }
    match String::from_utf8(bytes) {
        Ok(text) => Ok(Entry::text_file(Path::root(), text)),
        Err(e) => Ok(Entry::base64_file(Path::root(), BASE64.encode(e.as_bytes()))),
    }
}
