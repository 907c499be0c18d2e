//! The federated contents manager.
//!
//! `Router` presents every mounted backend as one tree. Each call resolves
//! its external path to a mount, hands the internal path to that mount's
//! backend, then rebases the returned entry (and any error) back into the
//! external namespace. The unified root and the mount roots are synthetic
//! and guarded here; backends never see an operation on them that would
//! remove or replace a mount.

use std::sync::Arc;

use hybridfs_contents::{
    BackendFactory, Entry, EntryKind, Error, GetOptions, Path, RouterConfig,
};

use crate::mover::{CrossBackendMover, MoveStep};
use crate::naming;
use crate::registry::{Mount, MountRegistry};
use crate::resolver::PathResolver;
use crate::root::RootAggregator;

/// Routes contents operations to the backend mounted at the longest
/// matching prefix.
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<MountRegistry>,
}

impl Router {
    pub fn new(registry: MountRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Build a router over a mount table that other routers may also use.
    pub fn from_shared(registry: Arc<MountRegistry>) -> Self {
        Self { registry }
    }

    pub fn from_config(config: &RouterConfig, factory: &dyn BackendFactory) -> Result<Self, Error> {
        Ok(Self::new(MountRegistry::from_config(config, factory)?))
    }

    pub fn registry(&self) -> &MountRegistry {
        &self.registry
    }

    /// Every mount, default first.
    pub fn mounts(&self) -> impl Iterator<Item = &Mount> {
        self.registry.all_mounts()
    }

    fn parse(path: &str) -> Result<Path, Error> {
        Ok(PathResolver::normalize(path)?)
    }

    /// Fetch the entry at `path`.
    ///
    /// The empty path returns the merged root listing.
    pub fn get(&self, path: &str, options: &GetOptions) -> Result<Entry, Error> {
        self.get_at(&Self::parse(path)?, options)
    }

    fn get_at(&self, path: &Path, options: &GetOptions) -> Result<Entry, Error> {
        if path.is_empty() {
            return RootAggregator::new(&self.registry).root_model(options);
        }

        let (mount, resolution) = self.registry.resolve(path)?;
        log::debug!(
            "get '{}' -> {} backend '{}'",
            path,
            mount.backend().label(),
            resolution.internal
        );
        mount
            .backend()
            .get(&resolution.internal, options)
            .map(|entry| entry.rebase(mount.prefix()))
            .map_err(|e| e.with_prefix(mount.prefix()))
    }

    /// Create or overwrite the entry at `path`.
    ///
    /// Saving a directory onto a non-default mount root is accepted as a
    /// no-op since the mount already provides that directory.
    pub fn save(&self, model: &Entry, path: &str) -> Result<Entry, Error> {
        self.save_at(model, &Self::parse(path)?)
    }

    fn save_at(&self, model: &Entry, path: &Path) -> Result<Entry, Error> {
        let (mount, resolution) = self.registry.resolve(path)?;

        if resolution.is_mount_root() && !mount.is_default() {
            if model.kind.is_directory() {
                log::debug!("save of directory at mount root '{}' is a no-op", path);
                return Ok(RootAggregator::mount_entry(mount));
            }
            return Err(Error::bad_request(format!(
                "cannot replace mount root '{}' with a {}",
                path, model.kind
            )));
        }

        log::debug!(
            "save '{}' -> {} backend '{}'",
            path,
            mount.backend().label(),
            resolution.internal
        );
        mount
            .backend()
            .save(model, &resolution.internal)
            .map(|entry| entry.rebase(mount.prefix()))
            .map_err(|e| e.with_prefix(mount.prefix()))
    }

    /// Remove the entry at `path`.
    pub fn delete(&self, path: &str) -> Result<(), Error> {
        let path = Self::parse(path)?;
        self.guard_mount_root(&path, "delete")?;

        let (mount, resolution) = self.registry.resolve(&path)?;
        log::debug!(
            "delete '{}' -> {} backend '{}'",
            path,
            mount.backend().label(),
            resolution.internal
        );
        mount
            .backend()
            .delete(&resolution.internal)
            .map_err(|e| e.with_prefix(mount.prefix()))
    }

    /// Move the entry at `old` to `new`.
    ///
    /// Within one backend this is the backend's own rename. Across backends
    /// it is a read, write, delete sequence; if only the delete fails the
    /// result is [`Error::PartialMove`] and the entry exists at both paths.
    pub fn rename(&self, old: &str, new: &str) -> Result<Entry, Error> {
        let old = Self::parse(old)?;
        let new = Self::parse(new)?;
        self.guard_mount_root(&old, "rename")?;
        self.guard_mount_root(&new, "rename onto")?;

        if old == new {
            return self.get_at(&new, &GetOptions::metadata());
        }

        let (old_mount, old_resolution) = self.registry.resolve(&old)?;
        let (new_mount, new_resolution) = self.registry.resolve(&new)?;

        if old_mount.shares_backend_with(new_mount) {
            log::debug!(
                "rename '{}' -> '{}' within {} backend",
                old,
                new,
                old_mount.backend().label()
            );
            return old_mount
                .backend()
                .rename(&old_resolution.internal, &new_resolution.internal)
                .map(|entry| entry.rebase(new_mount.prefix()))
                .map_err(|e| {
                    Self::shared_rename_error(
                        e,
                        (old_mount, &old_resolution.internal),
                        (new_mount, &new_resolution.internal),
                    )
                });
        }

        log::debug!(
            "rename '{}' -> '{}' across {} and {} backends",
            old,
            new,
            old_mount.backend().label(),
            new_mount.backend().label()
        );
        CrossBackendMover::new(old_mount, new_mount)
            .run(&old_resolution.internal, &new_resolution.internal)
            .map(|entry| entry.rebase(new_mount.prefix()))
            .map_err(|failure| match failure.step {
                MoveStep::DeleteSource => {
                    log::warn!(
                        "moved '{}' to '{}' but could not delete the source: {}",
                        old,
                        new,
                        failure.error
                    );
                    Error::PartialMove {
                        from: old.clone(),
                        to: new.clone(),
                        source: Box::new(failure.error),
                    }
                }
                MoveStep::Read | MoveStep::Write => failure.error,
            })
    }

    /// Children of the directory at `path`, without content.
    pub fn list(&self, path: &str) -> Result<Vec<Entry>, Error> {
        let options = GetOptions::default().with_kind(EntryKind::Directory);
        let entry = self.get(path, &options)?;
        Ok(entry.into_listing().unwrap_or_default())
    }

    pub fn exists(&self, path: &str) -> Result<bool, Error> {
        self.exists_at(&Self::parse(path)?)
    }

    fn exists_at(&self, path: &Path) -> Result<bool, Error> {
        if self.registry.is_mount_root(path) {
            return Ok(true);
        }
        let (mount, resolution) = self.registry.resolve(path)?;
        mount
            .backend()
            .exists(&resolution.internal)
            .map_err(|e| e.with_prefix(mount.prefix()))
    }

    pub fn file_exists(&self, path: &str) -> Result<bool, Error> {
        let path = Self::parse(path)?;
        if self.registry.is_mount_root(&path) {
            return Ok(false);
        }
        let (mount, resolution) = self.registry.resolve(&path)?;
        mount
            .backend()
            .file_exists(&resolution.internal)
            .map_err(|e| e.with_prefix(mount.prefix()))
    }

    pub fn dir_exists(&self, path: &str) -> Result<bool, Error> {
        self.dir_exists_at(&Self::parse(path)?)
    }

    fn dir_exists_at(&self, path: &Path) -> Result<bool, Error> {
        if self.registry.is_mount_root(path) {
            return Ok(true);
        }
        let (mount, resolution) = self.registry.resolve(path)?;
        mount
            .backend()
            .dir_exists(&resolution.internal)
            .map_err(|e| e.with_prefix(mount.prefix()))
    }

    /// Whether the owning backend hides `path` from listings. Mount roots
    /// are never hidden.
    pub fn is_hidden(&self, path: &str) -> Result<bool, Error> {
        let path = Self::parse(path)?;
        if self.registry.is_mount_root(&path) {
            return Ok(false);
        }
        let (mount, resolution) = self.registry.resolve(&path)?;
        mount
            .backend()
            .is_hidden(&resolution.internal)
            .map_err(|e| e.with_prefix(mount.prefix()))
    }

    /// Create an empty entry with a fresh name in directory `dir`.
    ///
    /// Without `kind`, an `.ipynb` extension makes a notebook and anything
    /// else a file. Names are `Untitled.ipynb`, `untitled<ext>` or
    /// `Untitled Folder`, numbered from 1 until no entry or mount has the
    /// name.
    pub fn new_untitled(
        &self,
        dir: &str,
        kind: Option<EntryKind>,
        ext: Option<&str>,
    ) -> Result<Entry, Error> {
        let dir = Self::parse(dir)?;
        if !self.dir_exists_at(&dir)? {
            return Err(Error::not_found(&dir));
        }

        let kind = kind.unwrap_or(match ext {
            Some(".ipynb") => EntryKind::Notebook,
            _ => EntryKind::File,
        });
        let name = naming::increment_name(&naming::untitled_name(kind, ext), "", |candidate| {
            self.exists_at(&dir.child(candidate)?)
        })?;

        self.save_at(&naming::untitled_model(kind), &dir.child(&name)?)
    }

    /// Copy the file or notebook at `from`.
    ///
    /// With no `to` the copy goes in the source's directory. When `to` is a
    /// directory the copy keeps the source name, or takes the first free
    /// `<stem>-Copy<n><ext>`. Any other `to` is the destination path itself.
    /// Copies may cross mounts.
    pub fn copy(&self, from: &str, to: Option<&str>) -> Result<Entry, Error> {
        let from = Self::parse(from)?;
        let source = self.get_at(&from, &GetOptions::default())?;
        if source.kind.is_directory() {
            return Err(Error::bad_request(format!(
                "cannot copy directory '{}'",
                from
            )));
        }

        let to = match to {
            Some(to) => Self::parse(to)?,
            None => from.parent(),
        };
        let target = if self.dir_exists_at(&to)? {
            let name = naming::increment_name(
                &naming::copy_base_name(from.name()),
                "-Copy",
                |candidate| self.exists_at(&to.child(candidate)?),
            )?;
            to.child(&name)?
        } else {
            to
        };

        log::debug!("copy '{}' -> '{}'", from, target);
        self.save_at(&source, &target)
    }

    /// Two mounts sharing a backend see one internal namespace, so a rename
    /// error is rebased onto whichever side's path it names. Paths related
    /// to both sides, such as a common parent, stay with the source.
    fn shared_rename_error(error: Error, old: (&Mount, &Path), new: (&Mount, &Path)) -> Error {
        let related = |path: &Path, side: &Path| side.has_prefix(path) || path.has_prefix(side);
        let about_destination = error
            .path()
            .is_some_and(|path| related(path, new.1) && !related(path, old.1));
        if about_destination {
            error.with_prefix(new.0.prefix())
        } else {
            error.with_prefix(old.0.prefix())
        }
    }

    fn guard_mount_root(&self, path: &Path, operation: &str) -> Result<(), Error> {
        if path.is_empty() {
            return Err(Error::bad_request(format!(
                "cannot {} the root directory",
                operation
            )));
        }
        if self.registry.is_mount_root(path) {
            return Err(Error::bad_request(format!(
                "cannot {} the root of mount '{}'",
                operation, path
            )));
        }
        Ok(())
    }
}
