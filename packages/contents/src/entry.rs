//! The Entry type - the uniform record for files, notebooks and directories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{EntryKind, Format, Path};

/// The `content` payload of an entry.
///
/// Serialized untagged, so a text file's content is a JSON string, a
/// notebook's is the notebook object and a directory's is an array of
/// child entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Text or base64 payload of a file; `Entry::format` says which.
    Text(String),
    /// Children of a directory, each without content.
    Listing(Vec<Entry>),
    /// A parsed notebook document.
    Json(JsonValue),
}

/// A file, notebook or directory model.
///
/// Backends produce entries whose `path` is relative to their own root; the
/// router re-stamps them with the external path (see [`Entry::rebase`])
/// before they reach a client. As a `save` argument only `type`, `format`
/// and `content` are significant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: Path,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub format: Option<Format>,
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default = "default_writable")]
    pub writable: bool,
}

fn default_writable() -> bool {
    true
}

impl Entry {
    /// A bare model with no content, format, mimetype or timestamps.
    pub fn new(path: Path, kind: EntryKind) -> Self {
        Self {
            name: path.name().to_string(),
            path,
            kind,
            format: None,
            content: None,
            mimetype: None,
            created: None,
            last_modified: None,
            writable: true,
        }
    }

    /// A directory model without content.
    pub fn directory(path: Path) -> Self {
        Self::new(path, EntryKind::Directory)
    }

    /// A text file model, suitable as a `save` argument.
    pub fn text_file(path: Path, text: impl Into<String>) -> Self {
        Self {
            format: Some(Format::Text),
            content: Some(Content::Text(text.into())),
            mimetype: Some("text/plain".to_string()),
            ..Self::new(path, EntryKind::File)
        }
    }

    /// A binary file model whose content is already base64 encoded.
    pub fn base64_file(path: Path, encoded: impl Into<String>) -> Self {
        Self {
            format: Some(Format::Base64),
            content: Some(Content::Text(encoded.into())),
            mimetype: Some("application/octet-stream".to_string()),
            ..Self::new(path, EntryKind::File)
        }
    }

    /// A notebook model.
    pub fn notebook(path: Path, document: JsonValue) -> Self {
        Self {
            format: Some(Format::Json),
            content: Some(Content::Json(document)),
            ..Self::new(path, EntryKind::Notebook)
        }
    }

    /// Set timestamps.
    #[must_use]
    pub fn with_times(
        mut self,
        created: Option<DateTime<Utc>>,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        self.created = created;
        self.last_modified = last_modified;
        self
    }

    /// Drop content and format, as for a listing child or a `content=false` get.
    #[must_use]
    pub fn without_content(mut self) -> Self {
        self.content = None;
        self.format = None;
        self
    }

    /// Re-stamp this entry and every listed child under `prefix`.
    ///
    /// `path` becomes `prefix/path` and `name` its final segment, so the
    /// root of a mount at `A` comes out named `A`.
    #[must_use]
    pub fn rebase(mut self, prefix: &Path) -> Self {
        if !prefix.is_empty() {
            self.path = prefix.join(&self.path);
        }
        self.name = self.path.name().to_string();
        if let Some(Content::Listing(children)) = self.content.take() {
            let children = children.into_iter().map(|c| c.rebase(prefix)).collect();
            self.content = Some(Content::Listing(children));
        }
        self
    }

    /// Text content of a file, whatever its format.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(Content::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Parsed document of a notebook.
    pub fn document(&self) -> Option<&JsonValue> {
        match &self.content {
            Some(Content::Json(v)) => Some(v),
            _ => None,
        }
    }

    /// Children of a directory listed with content.
    pub fn listing(&self) -> Option<&[Entry]> {
        match &self.content {
            Some(Content::Listing(children)) => Some(children),
            _ => None,
        }
    }

    /// Take the children out of a directory listed with content.
    pub fn into_listing(self) -> Option<Vec<Entry>> {
        match self.content {
            Some(Content::Listing(children)) => Some(children),
            _ => None,
        }
    }
}

/// Options for a `get`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GetOptions {
    /// Include the content payload.
    pub content: bool,
    /// Require the entry to be of this kind. `File` also forces a
    /// notebook to be read as a plain file.
    pub kind: Option<EntryKind>,
    /// Force the encoding of file content.
    pub format: Option<Format>,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            content: true,
            kind: None,
            format: None,
        }
    }
}

impl GetOptions {
    /// Metadata only.
    pub fn metadata() -> Self {
        Self {
            content: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }
}
