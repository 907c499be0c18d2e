//! The Backend trait: the single-namespace contents contract.

use std::sync::Arc;

use crate::{Entry, EntryKind, Error, GetOptions, Path};

/// A storage system that owns one contents namespace.
///
/// All paths are internal: relative to the backend's own root, with the
/// empty path naming that root. Backends know nothing about mounts.
///
/// # Object Safety
///
/// This trait is object-safe: mount tables hold `Arc<dyn Backend>`.
pub trait Backend: Send + Sync {
    /// Short label for logs.
    fn label(&self) -> &str;

    /// Read the entry at a path.
    ///
    /// # Errors
    ///
    /// * `NotFound` - nothing exists at the path.
    /// * `BadRequest` - the entry does not match `options.kind`, or its
    ///   content cannot be produced in `options.format`.
    fn get(&self, path: &Path, options: &GetOptions) -> Result<Entry, Error>;

    /// Create or overwrite the entry at a path from `model`.
    ///
    /// Only `model.kind`, `model.format` and `model.content` are read.
    /// Returns the saved entry without content.
    fn save(&self, model: &Entry, path: &Path) -> Result<Entry, Error>;

    /// Remove the entry at a path, including everything beneath a directory.
    fn delete(&self, path: &Path) -> Result<(), Error>;

    /// Move an entry within this backend. Returns the entry at its new path
    /// without content.
    fn rename(&self, from: &Path, to: &Path) -> Result<Entry, Error>;

    /// Children of the directory at a path, without content.
    fn list(&self, path: &Path) -> Result<Vec<Entry>, Error> {
        let options = GetOptions::default().with_kind(EntryKind::Directory);
        Ok(self.get(path, &options)?.into_listing().unwrap_or_default())
    }

    /// Whether anything exists at a path.
    fn exists(&self, path: &Path) -> Result<bool, Error> {
        match self.get(path, &GetOptions::metadata()) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether a file or notebook exists at a path.
    fn file_exists(&self, path: &Path) -> Result<bool, Error> {
        match self.get(path, &GetOptions::metadata()) {
            Ok(entry) => Ok(!entry.kind.is_directory()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether a directory exists at a path.
    fn dir_exists(&self, path: &Path) -> Result<bool, Error> {
        match self.get(path, &GetOptions::metadata()) {
            Ok(entry) => Ok(entry.kind.is_directory()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether the path is hidden from listings.
    fn is_hidden(&self, path: &Path) -> Result<bool, Error> {
        Ok(path.is_hidden())
    }
}

/// A shared, type-erased backend.
pub type BackendRef = Arc<dyn Backend>;

impl<T: Backend + ?Sized> Backend for Arc<T> {
    fn label(&self) -> &str {
        self.as_ref().label()
    }

    fn get(&self, path: &Path, options: &GetOptions) -> Result<Entry, Error> {
        self.as_ref().get(path, options)
    }

    fn save(&self, model: &Entry, path: &Path) -> Result<Entry, Error> {
        self.as_ref().save(model, path)
    }

    fn delete(&self, path: &Path) -> Result<(), Error> {
        self.as_ref().delete(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<Entry, Error> {
        self.as_ref().rename(from, to)
    }

    fn list(&self, path: &Path) -> Result<Vec<Entry>, Error> {
        self.as_ref().list(path)
    }

    fn exists(&self, path: &Path) -> Result<bool, Error> {
        self.as_ref().exists(path)
    }

    fn file_exists(&self, path: &Path) -> Result<bool, Error> {
        self.as_ref().file_exists(path)
    }

    fn dir_exists(&self, path: &Path) -> Result<bool, Error> {
        self.as_ref().dir_exists(path)
    }

    fn is_hidden(&self, path: &Path) -> Result<bool, Error> {
        self.as_ref().is_hidden(path)
    }
}

impl<T: Backend + ?Sized> Backend for Box<T> {
    fn label(&self) -> &str {
        self.as_ref().label()
    }

    fn get(&self, path: &Path, options: &GetOptions) -> Result<Entry, Error> {
        self.as_ref().get(path, options)
    }

    fn save(&self, model: &Entry, path: &Path) -> Result<Entry, Error> {
        self.as_ref().save(model, path)
    }

    fn delete(&self, path: &Path) -> Result<(), Error> {
        self.as_ref().delete(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<Entry, Error> {
        self.as_ref().rename(from, to)
    }

    fn list(&self, path: &Path) -> Result<Vec<Entry>, Error> {
        self.as_ref().list(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{path, Content, Format};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Flat map of paths to entries; directories are implied by keys.
    struct TestBackend {
        entries: Mutex<BTreeMap<Path, Entry>>,
    }

    impl TestBackend {
        fn new() -> Self {
            Self {
                entries: Mutex::new(BTreeMap::new()),
            }
        }
    }

    impl Backend for TestBackend {
        fn label(&self) -> &str {
            "test"
        }

        fn get(&self, path: &Path, options: &GetOptions) -> Result<Entry, Error> {
            let entries = self.entries.lock().unwrap();
            if path.is_empty() {
                let mut root = Entry::directory(Path::root());
                if options.content {
                    root.format = Some(Format::Json);
                    root.content = Some(Content::Listing(
                        entries.values().cloned().map(Entry::without_content).collect(),
                    ));
                }
                return Ok(root);
            }
            entries
                .get(path)
                .cloned()
                .ok_or_else(|| Error::not_found(path))
        }

        fn save(&self, model: &Entry, path: &Path) -> Result<Entry, Error> {
            let mut saved = model.clone();
            saved.path = path.clone();
            saved.name = path.name().to_string();
            self.entries.lock().unwrap().insert(path.clone(), saved.clone());
            Ok(saved.without_content())
        }

        fn delete(&self, path: &Path) -> Result<(), Error> {
            self.entries
                .lock()
                .unwrap()
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| Error::not_found(path))
        }

        fn rename(&self, from: &Path, to: &Path) -> Result<Entry, Error> {
            let entry = self.get(from, &GetOptions::default())?;
            self.delete(from)?;
            self.save(&entry, to)
        }
    }

    #[test]
    fn default_list_uses_directory_get() {
        let backend = TestBackend::new();
        backend
            .save(&Entry::text_file(path!("a.txt"), "a"), &path!("a.txt"))
            .unwrap();

        let listing = backend.list(&Path::root()).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "a.txt");
        assert!(listing[0].content.is_none());
    }

    #[test]
    fn default_existence_checks() {
        let backend = TestBackend::new();
        backend
            .save(&Entry::text_file(path!("a.txt"), "a"), &path!("a.txt"))
            .unwrap();

        assert!(backend.exists(&path!("a.txt")).unwrap());
        assert!(backend.file_exists(&path!("a.txt")).unwrap());
        assert!(!backend.dir_exists(&path!("a.txt")).unwrap());
        assert!(backend.dir_exists(&Path::root()).unwrap());
        assert!(!backend.exists(&path!("missing")).unwrap());
        assert!(backend.is_hidden(&path!(".secret")).unwrap());
    }

    #[test]
    fn object_safety_works() {
        let backend: BackendRef = Arc::new(TestBackend::new());
        backend
            .save(&Entry::text_file(path!("x"), "hello"), &path!("x"))
            .unwrap();
        let entry = backend.get(&path!("x"), &GetOptions::default()).unwrap();
        assert_eq!(entry.text(), Some("hello"));
    }
}
