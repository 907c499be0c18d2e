//! In-memory contents backend.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use hybridfs_contents::{Backend, Content, Entry, EntryKind, Error, Format, GetOptions, Path};

use crate::codec;

#[derive(Debug, Clone)]
enum Node {
    Directory {
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    },
    File {
        bytes: Vec<u8>,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    },
}

impl Node {
    fn directory() -> Self {
        let now = Utc::now();
        Node::Directory {
            created: now,
            modified: now,
        }
    }

    fn is_directory(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    fn times(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            Node::Directory { created, modified } | Node::File { created, modified, .. } => {
                (*created, *modified)
            }
        }
    }
}

type Table = BTreeMap<Path, Node>;

/// A contents backend held entirely in memory.
///
/// Entries live in one table keyed by path; the root directory is always
/// present. The table sits behind a lock so the backend can be shared
/// between mounts and threads.
///
/// # Example
///
/// ```rust
/// use hybridfs_backends::InMemoryBackend;
/// use hybridfs_contents::{path, Backend, Entry, GetOptions, Path};
///
/// let backend = InMemoryBackend::new();
/// backend.save(&Entry::text_file(Path::root(), "hello"), &path!("a.txt")).unwrap();
///
/// let entry = backend.get(&path!("a.txt"), &GetOptions::default()).unwrap();
/// assert_eq!(entry.text(), Some("hello"));
/// ```
#[derive(Debug)]
pub struct InMemoryBackend {
    nodes: RwLock<Table>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(Path::root(), Node::directory());
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    fn read_table(&self) -> Result<RwLockReadGuard<'_, Table>, Error> {
        self.nodes
            .read()
            .map_err(|_| Error::backend_msg(&Path::root(), "in-memory table lock poisoned"))
    }

    fn write_table(&self) -> Result<RwLockWriteGuard<'_, Table>, Error> {
        self.nodes
            .write()
            .map_err(|_| Error::backend_msg(&Path::root(), "in-memory table lock poisoned"))
    }

    fn describe(table: &Table, path: &Path, node: &Node, options: &GetOptions) -> Result<Entry, Error> {
        let (created, modified) = node.times();
        let entry = match node {
            Node::Directory { .. } => {
                codec::check_directory_kind(path, options.kind)?;
                let mut entry = Entry::directory(path.clone());
                if options.content {
                    let mut children = Vec::new();
                    for (child_path, child) in Self::children(table, path) {
                        children.push(Self::describe(
                            table,
                            child_path,
                            child,
                            &GetOptions::metadata(),
                        )?);
                    }
                    entry.format = Some(Format::Json);
                    entry.content = Some(Content::Listing(children));
                }
                entry
            }
            Node::File { bytes, .. } => codec::file_entry(path, bytes, options)?,
        };
        Ok(entry.with_times(Some(created), Some(modified)))
    }

    fn children<'t>(table: &'t Table, dir: &'t Path) -> impl Iterator<Item = (&'t Path, &'t Node)> {
        table
            .range(dir.clone()..)
            .skip(1)
            .take_while(move |(path, _)| path.has_prefix(dir))
            .filter(move |(path, _)| path.len() == dir.len() + 1)
    }

    /// The parent of `path` must be an existing directory.
    fn check_parent(table: &Table, path: &Path) -> Result<(), Error> {
        let parent = path.parent();
        match table.get(&parent) {
            Some(node) if node.is_directory() => Ok(()),
            Some(_) => Err(Error::rejected(&parent, "not a directory")),
            None => Err(Error::not_found(&parent)),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for InMemoryBackend {
    fn label(&self) -> &str {
        "memory"
    }

    fn get(&self, path: &Path, options: &GetOptions) -> Result<Entry, Error> {
        let table = self.read_table()?;
        let node = table.get(path).ok_or_else(|| Error::not_found(path))?;
        Self::describe(&table, path, node, options)
    }

    fn save(&self, model: &Entry, path: &Path) -> Result<Entry, Error> {
        let mut table = self.write_table()?;

        if path.is_empty() {
            if model.kind.is_directory() {
                let root = table.get(path).ok_or_else(|| Error::not_found(path))?;
                return Self::describe(&table, path, root, &GetOptions::metadata());
            }
            return Err(Error::bad_request("cannot replace the root directory"));
        }
        Self::check_parent(&table, path)?;

        let existing = table.get(path);
        let now = Utc::now();
        let created = existing.map(|node| node.times().0).unwrap_or(now);

        let node = match (model.kind, existing) {
            (EntryKind::Directory, Some(Node::File { .. })) => {
                return Err(Error::rejected(path, "is a file"));
            }
            (EntryKind::Directory, _) => Node::Directory {
                created,
                modified: now,
            },
            (_, Some(Node::Directory { .. })) => {
                return Err(Error::rejected(path, "is a directory"));
            }
            (_, _) => Node::File {
                bytes: codec::encode(path, model)?,
                created,
                modified: now,
            },
        };

        log::debug!("saving {} '{}' in memory", model.kind, path);
        table.insert(path.clone(), node);
        Ok(Entry::new(path.clone(), model.kind).with_times(Some(created), Some(now)))
    }

    fn delete(&self, path: &Path) -> Result<(), Error> {
        if path.is_empty() {
            return Err(Error::bad_request("cannot delete the root directory"));
        }
        let mut table = self.write_table()?;
        if !table.contains_key(path) {
            return Err(Error::not_found(path));
        }
        log::debug!("deleting '{}' from memory", path);
        table.retain(|key, _| !key.has_prefix(path));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<Entry, Error> {
        if from.is_empty() || to.is_empty() {
            return Err(Error::bad_request("cannot rename the root directory"));
        }
        let mut table = self.write_table()?;
        if !table.contains_key(from) {
            return Err(Error::not_found(from));
        }
        if table.contains_key(to) {
            return Err(Error::rejected(to, "already exists"));
        }
        if to.has_prefix(from) {
            return Err(Error::rejected(from, "cannot be moved into itself"));
        }
        Self::check_parent(&table, to)?;

        let moved: Vec<Path> = table
            .keys()
            .filter(|key| key.has_prefix(from))
            .cloned()
            .collect();
        for old in moved {
            if let (Some(node), Some(rest)) = (table.remove(&old), old.strip_prefix(from)) {
                table.insert(to.join(&rest), node);
            }
        }

        let node = table.get(to).ok_or_else(|| Error::not_found(to))?;
        Self::describe(&table, to, node, &GetOptions::metadata())
    }
}
