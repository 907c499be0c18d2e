//! Content format and entry kind tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The wire format of an entry's `content` field.
///
/// Notebooks and directory listings are `Json`; files are `Text` when they
/// decode as UTF-8 and `Base64` otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Text,
    Base64,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Text => "text",
            Format::Base64 => "base64",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Format::Json),
            "text" => Ok(Format::Text),
            "base64" => Ok(Format::Base64),
            other => Err(format!("unknown format: {}", other)),
        }
    }
}

/// What an entry is. Serialized under the `type` key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Notebook,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Notebook => "notebook",
            EntryKind::Directory => "directory",
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(EntryKind::File),
            "notebook" => Ok(EntryKind::Notebook),
            "directory" => Ok(EntryKind::Directory),
            other => Err(format!("unknown entry type: {}", other)),
        }
    }
}
