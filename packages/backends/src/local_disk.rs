//! Contents backend over a local directory.

use std::{ffi, fs, io, path};

use chrono::{DateTime, Utc};

use hybridfs_contents::{Backend, Content, Entry, Error, Format, GetOptions, Path};

use crate::codec;

/// Serves the directory tree under `root`.
///
/// Each contents path maps onto the file system path of the same
/// components under the root. Notebooks are stored as their JSON text and
/// files as raw bytes.
pub struct LocalDiskBackend {
    root: path::PathBuf,
}

impl LocalDiskBackend {
    /// Open `root`, which must be an existing, writable directory.
    pub fn new(root: path::PathBuf) -> Result<LocalDiskBackend, Error> {
        let attr = fs::metadata(&root).map_err(|error| {
            Error::backend(
                &Path::root(),
                format!("root path {} is invalid", root.display()),
                error,
            )
        })?;

        if !attr.is_dir() {
            return Err(Error::backend_msg(
                &Path::root(),
                format!("root path {} must be a directory", root.display()),
            ));
        }

        if attr.permissions().readonly() {
            return Err(Error::backend_msg(
                &Path::root(),
                format!("root directory {} must be writable", root.display()),
            ));
        }

        let root = root.canonicalize().map_err(|error| {
            Error::backend(
                &Path::root(),
                format!("root path {} could not be resolved", root.display()),
                error,
            )
        })?;
        log::debug!("serving local directory {}", root.display());
        Ok(LocalDiskBackend { root })
    }

    pub fn root(&self) -> &path::Path {
        &self.root
    }

    fn os_path(&self, path: &Path) -> path::PathBuf {
        self.root
            .components()
            .chain(
                path.components
                    .iter()
                    .map(|s| path::Component::Normal(ffi::OsStr::new(s))),
            )
            .collect()
    }

    fn io_error(path: &Path, action: &str, error: io::Error) -> Error {
        if error.kind() == io::ErrorKind::NotFound {
            Error::not_found(path)
        } else {
            Error::backend(path, format!("{} failed", action), error)
        }
    }

    fn times(attr: &fs::Metadata) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let created = attr.created().ok().map(DateTime::<Utc>::from);
        let modified = attr.modified().ok().map(DateTime::<Utc>::from);
        (created.or(modified), modified)
    }

    fn metadata(&self, path: &Path) -> Result<fs::Metadata, Error> {
        fs::metadata(self.os_path(path)).map_err(|e| Self::io_error(path, "stat", e))
    }

    fn describe(&self, path: &Path, options: &GetOptions) -> Result<Entry, Error> {
        let file_path = self.os_path(path);
        let attr = self.metadata(path)?;
        let (created, modified) = Self::times(&attr);

        let entry = if attr.is_dir() {
            codec::check_directory_kind(path, options.kind)?;
            let mut entry = Entry::directory(path.clone());
            if options.content {
                entry.format = Some(Format::Json);
                entry.content = Some(Content::Listing(self.children(path)?));
            }
            entry
        } else {
            let bytes = if options.content {
                log::debug!("Reading {}...", file_path.display());
                fs::read(&file_path).map_err(|e| Self::io_error(path, "read", e))?
            } else {
                Vec::new()
            };
            codec::file_entry(path, &bytes, options)?
        };
        Ok(entry.with_times(created, modified))
    }

    fn children(&self, dir: &Path) -> Result<Vec<Entry>, Error> {
        let read_dir =
            fs::read_dir(self.os_path(dir)).map_err(|e| Self::io_error(dir, "list", e))?;

        let mut children = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| Self::io_error(dir, "list", e))?;
            let name = match dir_entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    log::warn!("skipping non-UTF-8 name {:?} in '{}'", raw, dir);
                    continue;
                }
            };
            let child = match dir.child(&name) {
                Ok(child) => child,
                Err(e) => {
                    log::warn!("skipping '{}' in '{}': {}", name, dir, e);
                    continue;
                }
            };
            match self.describe(&child, &GetOptions::metadata()) {
                Ok(entry) => children.push(entry),
                // Removed between listing and stat.
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn check_parent(&self, path: &Path) -> Result<(), Error> {
        let parent = path.parent();
        if self.metadata(&parent)?.is_dir() {
            Ok(())
        } else {
            Err(Error::rejected(&parent, "not a directory"))
        }
    }

    fn existing(&self, path: &Path) -> Result<Option<fs::Metadata>, Error> {
        match fs::symlink_metadata(self.os_path(path)) {
            Ok(attr) => Ok(Some(attr)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(path, "stat", e)),
        }
    }
}

impl Backend for LocalDiskBackend {
    fn label(&self) -> &str {
        "local"
    }

    fn get(&self, path: &Path, options: &GetOptions) -> Result<Entry, Error> {
        self.describe(path, options)
    }

    fn save(&self, model: &Entry, path: &Path) -> Result<Entry, Error> {
        if path.is_empty() {
            if model.kind.is_directory() {
                return self.describe(path, &GetOptions::metadata());
            }
            return Err(Error::bad_request("cannot replace the root directory"));
        }
        self.check_parent(path)?;

        let file_path = self.os_path(path);
        let existing = self.existing(path)?;

        if model.kind.is_directory() {
            match existing {
                Some(attr) if !attr.is_dir() => {
                    return Err(Error::rejected(path, "is a file"));
                }
                Some(_) => {}
                None => {
                    log::debug!("Creating directory {}...", file_path.display());
                    fs::create_dir(&file_path)
                        .map_err(|e| Self::io_error(path, "create directory", e))?;
                }
            }
        } else {
            if existing.map(|attr| attr.is_dir()).unwrap_or(false) {
                return Err(Error::rejected(path, "is a directory"));
            }
            let bytes = codec::encode(path, model)?;
            log::debug!("Writing {}...", file_path.display());
            fs::write(&file_path, bytes).map_err(|e| Self::io_error(path, "write", e))?;
        }

        let (created, modified) = Self::times(&self.metadata(path)?);
        Ok(Entry::new(path.clone(), model.kind).with_times(created, modified))
    }

    fn delete(&self, path: &Path) -> Result<(), Error> {
        if path.is_empty() {
            return Err(Error::bad_request("cannot delete the root directory"));
        }
        let attr = self.existing(path)?.ok_or_else(|| Error::not_found(path))?;
        let file_path = self.os_path(path);
        log::debug!("Removing {}...", file_path.display());
        let removed = if attr.is_dir() {
            fs::remove_dir_all(&file_path)
        } else {
            fs::remove_file(&file_path)
        };
        removed.map_err(|e| Self::io_error(path, "delete", e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<Entry, Error> {
        if from.is_empty() || to.is_empty() {
            return Err(Error::bad_request("cannot rename the root directory"));
        }
        if self.existing(from)?.is_none() {
            return Err(Error::not_found(from));
        }
        if self.existing(to)?.is_some() {
            return Err(Error::rejected(to, "already exists"));
        }
        if to.has_prefix(from) {
            return Err(Error::rejected(from, "cannot be moved into itself"));
        }
        self.check_parent(to)?;

        log::debug!("Renaming '{}' to '{}'...", from, to);
        fs::rename(self.os_path(from), self.os_path(to))
            .map_err(|e| Self::io_error(from, "rename", e))?;
        self.describe(to, &GetOptions::metadata())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybridfs_contents::{path, EntryKind};
    use serde_json::json;

    fn backend() -> (tempfile::TempDir, LocalDiskBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalDiskBackend::new(dir.path().to_path_buf()).unwrap();
        (dir, backend)
    }

    #[test]
    fn root_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, b"x").unwrap();
        assert!(LocalDiskBackend::new(file).is_err());
        assert!(LocalDiskBackend::new(dir.path().join("missing")).is_err());
    }

    #[test]
    fn writes_land_on_disk() {
        let (dir, backend) = backend();
        backend
            .save(&Entry::directory(Path::root()), &path!("docs"))
            .unwrap();
        backend
            .save(&Entry::text_file(Path::root(), "hello"), &path!("docs/a.txt"))
            .unwrap();
        let on_disk = fs::read_to_string(dir.path().join("docs").join("a.txt")).unwrap();
        assert_eq!(on_disk, "hello");
    }

    #[test]
    fn reads_existing_files() {
        let (dir, backend) = backend();
        fs::write(dir.path().join("raw.bin"), [0u8, 159, 146, 150]).unwrap();
        fs::write(dir.path().join("note.md"), "# hi").unwrap();

        let raw = backend
            .get(&path!("raw.bin"), &GetOptions::default())
            .unwrap();
        assert_eq!(raw.format, Some(Format::Base64));
        let note = backend
            .get(&path!("note.md"), &GetOptions::default())
            .unwrap();
        assert_eq!(note.text(), Some("# hi"));
        assert_eq!(note.mimetype.as_deref(), Some("text/markdown"));
        assert!(note.last_modified.is_some());
    }

    #[test]
    fn notebooks_round_trip_as_json() {
        let (_dir, backend) = backend();
        let doc = json!({"cells": [], "metadata": {}, "nbformat": 4, "nbformat_minor": 5});
        let saved = backend
            .save(&Entry::notebook(Path::root(), doc.clone()), &path!("nb.ipynb"))
            .unwrap();
        assert_eq!(saved.kind, EntryKind::Notebook);
        assert!(saved.content.is_none());

        let nb = backend
            .get(&path!("nb.ipynb"), &GetOptions::default())
            .unwrap();
        assert_eq!(nb.document(), Some(&doc));
    }

    #[test]
    fn listing_is_sorted_and_content_free() {
        let (dir, backend) = backend();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let entries = backend.list(&Path::root()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert!(entries.iter().all(|e| e.content.is_none()));
        assert_eq!(entries[2].kind, EntryKind::Directory);
    }

    #[test]
    fn missing_paths_are_not_found() {
        let (_dir, backend) = backend();
        let err = backend
            .get(&path!("nope.txt"), &GetOptions::default())
            .unwrap_err();
        assert!(err.is_not_found());

        let err = backend
            .save(&Entry::text_file(Path::root(), "x"), &path!("no/x.txt"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: no");
    }

    #[test]
    fn delete_removes_trees() {
        let (dir, backend) = backend();
        fs::create_dir_all(dir.path().join("a").join("b")).unwrap();
        fs::write(dir.path().join("a").join("b").join("c.txt"), "c").unwrap();

        backend.delete(&path!("a")).unwrap();
        assert!(!dir.path().join("a").exists());
        assert!(backend.delete(&path!("a")).unwrap_err().is_not_found());
        assert_eq!(backend.delete(&Path::root()).unwrap_err().status_code(), 400);
    }

    #[test]
    fn rename_within_root() {
        let (dir, backend) = backend();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();

        let entry = backend.rename(&path!("a.txt"), &path!("c.txt")).unwrap();
        assert_eq!(entry.path, path!("c.txt"));
        assert!(dir.path().join("c.txt").exists());

        let err = backend.rename(&path!("c.txt"), &path!("b.txt")).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(backend
            .rename(&path!("gone"), &path!("x"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn kinds_cannot_be_swapped_by_save() {
        let (dir, backend) = backend();
        fs::create_dir(dir.path().join("d")).unwrap();
        fs::write(dir.path().join("f"), "f").unwrap();
        assert!(backend
            .save(&Entry::text_file(Path::root(), "x"), &path!("d"))
            .is_err());
        assert!(backend
            .save(&Entry::directory(Path::root()), &path!("f"))
            .is_err());
        assert!(backend
            .save(&Entry::directory(Path::root()), &path!("d"))
            .is_ok());
    }
}
