//! Conversion between stored bytes and entry models.
//!
//! Both backends store files and notebooks as raw bytes and share these
//! rules for how bytes become content on `get` and content becomes bytes
//! on `save`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value as JsonValue;

use hybridfs_contents::{Content, Entry, EntryKind, Error, Format, GetOptions, Path};

pub const NOTEBOOK_SUFFIX: &str = ".ipynb";

pub fn is_notebook_name(name: &str) -> bool {
    name.ends_with(NOTEBOOK_SUFFIX)
}

/// The kind a stored file is reported as, given the kind the caller asked
/// for. Asking for `file` reads a notebook as a plain file.
pub fn file_kind(path: &Path, requested: Option<EntryKind>) -> Result<EntryKind, Error> {
    match requested {
        None if is_notebook_name(path.name()) => Ok(EntryKind::Notebook),
        None | Some(EntryKind::File) => Ok(EntryKind::File),
        Some(EntryKind::Notebook) if is_notebook_name(path.name()) => Ok(EntryKind::Notebook),
        Some(EntryKind::Notebook) => Err(Error::rejected(path, "not a notebook")),
        Some(EntryKind::Directory) => Err(Error::rejected(path, "not a directory")),
    }
}

/// Reject a directory get that asked for another kind.
pub fn check_directory_kind(path: &Path, requested: Option<EntryKind>) -> Result<(), Error> {
    match requested {
        Some(kind) if kind != EntryKind::Directory => Err(Error::rejected(
            path,
            format!("is a directory, not a {}", kind),
        )),
        _ => Ok(()),
    }
}

/// Decode file content. Without a requested format, UTF-8 data is text and
/// anything else base64.
pub fn decode_file(
    path: &Path,
    bytes: &[u8],
    format: Option<Format>,
) -> Result<(Format, Content), Error> {
    match format {
        None => match std::str::from_utf8(bytes) {
            Ok(text) => Ok((Format::Text, Content::Text(text.to_string()))),
            Err(_) => Ok((Format::Base64, Content::Text(BASE64.encode(bytes)))),
        },
        Some(Format::Text) => match std::str::from_utf8(bytes) {
            Ok(text) => Ok((Format::Text, Content::Text(text.to_string()))),
            Err(_) => Err(Error::rejected(path, "not UTF-8 encoded")),
        },
        Some(Format::Base64) => Ok((Format::Base64, Content::Text(BASE64.encode(bytes)))),
        Some(Format::Json) => Err(Error::rejected(path, "files cannot be read as json")),
    }
}

/// Parse a stored notebook document.
pub fn decode_notebook(path: &Path, bytes: &[u8]) -> Result<JsonValue, Error> {
    serde_json::from_slice(bytes)
        .map_err(|e| Error::rejected(path, format!("unreadable notebook: {}", e)))
}

/// The model of a stored file or notebook.
///
/// Mimetype and content are only filled in when `options.content` is set.
pub fn file_entry(path: &Path, bytes: &[u8], options: &GetOptions) -> Result<Entry, Error> {
    let kind = file_kind(path, options.kind)?;
    let mut entry = Entry::new(path.clone(), kind);
    if !options.content {
        return Ok(entry);
    }

    match kind {
        EntryKind::Notebook => {
            entry.format = Some(Format::Json);
            entry.content = Some(Content::Json(decode_notebook(path, bytes)?));
        }
        _ => {
            let (format, content) = decode_file(path, bytes, options.format)?;
            entry.mimetype = Some(guess_mimetype(path.name(), format).to_string());
            entry.format = Some(format);
            entry.content = Some(content);
        }
    }
    Ok(entry)
}

/// The bytes to store for a file or notebook model.
pub fn encode(path: &Path, model: &Entry) -> Result<Vec<u8>, Error> {
    let content = model
        .content
        .as_ref()
        .ok_or_else(|| Error::rejected(path, "no content to save"))?;

    match (model.kind, content) {
        (EntryKind::Notebook, Content::Json(document)) => serde_json::to_vec_pretty(document)
            .map_err(|e| Error::backend(path, "notebook could not be serialized", e)),
        (EntryKind::Notebook, Content::Text(text)) => {
            // Accept a notebook sent as a JSON string, but only a valid one.
            decode_notebook(path, text.as_bytes())?;
            Ok(text.clone().into_bytes())
        }
        (EntryKind::File, Content::Text(text)) => match model.format {
            Some(Format::Base64) => BASE64
                .decode(text.as_bytes())
                .map_err(|e| Error::rejected(path, format!("invalid base64 content: {}", e))),
            None | Some(Format::Text) => Ok(text.clone().into_bytes()),
            Some(Format::Json) => Err(Error::rejected(
                path,
                "files must be saved as text or base64",
            )),
        },
        (kind, _) => Err(Error::rejected(
            path,
            format!("content does not match a {} model", kind),
        )),
    }
}

/// A mimetype from the file extension, falling back on the format.
pub fn guess_mimetype(name: &str, format: Format) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("py") => "text/x-python",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        _ if format == Format::Base64 => "application/octet-stream",
        _ => "text/plain",
    }
}
