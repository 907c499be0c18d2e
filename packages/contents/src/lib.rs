//! hybridfs contents: the model layer.
//!
//! Everything a backend and the router agree on:
//! - `Path`: normalized forward-slash path, external or internal
//! - `Entry`: the file/notebook/directory model with its `Content`
//! - `Error`: failures, classified as not-found, bad-request or internal
//! - `Backend`: the single-namespace contents contract
//! - `RouterConfig`: the mount table configuration
//!
//! # Example
//!
//! ```rust
//! use hybridfs_contents::{Backend, Entry, Error, GetOptions, path};
//!
//! fn read_text(backend: &dyn Backend) -> Result<Option<String>, Error> {
//!     let entry = backend.get(&path!("notes/todo.txt"), &GetOptions::default())?;
//!     Ok(entry.text().map(str::to_string))
//! }
//! ```

mod config;
mod entry;
mod error;
mod format;
mod path;
mod traits;

pub use config::{BackendFactory, MountConfig, RouterConfig};
pub use entry::{Content, Entry, GetOptions};
pub use error::{Error, ErrorKind};
pub use format::{EntryKind, Format};
pub use path::{Path, PathError};
pub use traits::{Backend, BackendRef};
