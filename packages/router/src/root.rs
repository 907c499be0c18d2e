//! The virtual root directory.
//!
//! The root of the unified namespace is the default backend's root plus one
//! synthetic directory per non-default mount. A real top-level entry whose
//! name equals a mount prefix is a configuration error: it is unreachable
//! through the router, and both entries are listed as-is.

use hybridfs_contents::{Content, Entry, EntryKind, Error, Format, GetOptions, Path};

use crate::registry::{Mount, MountRegistry};

/// Builds listings and models for the unified root.
pub struct RootAggregator<'a> {
    registry: &'a MountRegistry,
}

impl<'a> RootAggregator<'a> {
    pub fn new(registry: &'a MountRegistry) -> Self {
        Self { registry }
    }

    /// The directory entry standing in for a mount at the root.
    pub fn mount_entry(mount: &Mount) -> Entry {
        let mut entry = Entry::directory(mount.prefix().clone());
        entry.name = mount.prefix().to_string();
        entry
    }

    /// The default backend's root entries followed by one directory per
    /// non-default mount.
    pub fn list_root(&self) -> Result<Vec<Entry>, Error> {
        let mut entries = self.registry.default_mount().backend().list(&Path::root())?;

        for mount in self.registry.non_default_mounts() {
            let synthetic = Self::mount_entry(mount);
            if entries.iter().any(|e| e.name == synthetic.name) {
                log::warn!(
                    "default backend has a top-level entry named '{}', shadowed by the mount of the same name",
                    synthetic.name
                );
            }
            entries.push(synthetic);
        }

        Ok(entries)
    }

    /// The model of the root itself, with the merged listing when
    /// `options.content` is set.
    pub fn root_model(&self, options: &GetOptions) -> Result<Entry, Error> {
        if let Some(kind) = options.kind {
            if kind != EntryKind::Directory {
                return Err(Error::bad_request(format!(
                    "the root is a directory, not a {}",
                    kind
                )));
            }
        }

        let metadata = GetOptions::metadata().with_kind(EntryKind::Directory);
        let mut root = self
            .registry
            .default_mount()
            .backend()
            .get(&Path::root(), &metadata)?
            .rebase(&Path::root());

        if options.content {
            root.format = Some(Format::Json);
            root.content = Some(Content::Listing(self.list_root()?));
        }
        Ok(root)
    }
}
