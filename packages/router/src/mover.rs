//! Moving entries between two backends.
//!
//! No backend can move an entry into another backend's storage, so a
//! cross-mount rename is emulated as three steps:
//!
//! 1. `Read` the full model from the source. Nothing has been mutated.
//! 2. `Write` it to the destination. A directory is written entry by
//!    entry, so on failure whatever reached the destination is deleted
//!    again. The source is still intact and the move can be retried.
//! 3. `DeleteSource`. If this fails the entry exists at both paths. The
//!    written copy is kept; no rollback is attempted.
//!
//! Nothing isolates these steps from concurrent operations on the same
//! source path.

use std::fmt;

use hybridfs_contents::{Entry, Error, GetOptions, Path};

use crate::registry::Mount;

/// A step of a cross-backend move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStep {
    Read,
    Write,
    DeleteSource,
}

impl fmt::Display for MoveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MoveStep::Read => "read",
            MoveStep::Write => "write",
            MoveStep::DeleteSource => "delete-source",
        })
    }
}

/// The step a move stopped at and why. Paths inside `error` are external.
#[derive(Debug)]
pub struct MoveFailure {
    pub step: MoveStep,
    pub error: Error,
}

impl MoveFailure {
    /// True when the source entry was left untouched.
    pub fn source_intact(&self) -> bool {
        self.step != MoveStep::DeleteSource
    }
}

/// Moves one entry from a mount to a different mount.
pub struct CrossBackendMover<'a> {
    source: &'a Mount,
    destination: &'a Mount,
}

impl<'a> CrossBackendMover<'a> {
    pub fn new(source: &'a Mount, destination: &'a Mount) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Move `from` (internal to the source mount) to `to` (internal to the
    /// destination mount). Returns the written entry, internal to the
    /// destination.
    pub fn run(&self, from: &Path, to: &Path) -> Result<Entry, MoveFailure> {
        let model = self.read(from, to).map_err(|error| MoveFailure {
            step: MoveStep::Read,
            error,
        })?;

        let written = match self.write(&model, to) {
            Ok(written) => written,
            Err(error) => {
                self.discard_destination(to);
                return Err(MoveFailure {
                    step: MoveStep::Write,
                    error,
                });
            }
        };

        self.delete_source(from).map_err(|error| MoveFailure {
            step: MoveStep::DeleteSource,
            error,
        })?;

        Ok(written)
    }

    fn read(&self, from: &Path, to: &Path) -> Result<Entry, Error> {
        log::debug!(
            "move read: '{}' from {} backend",
            self.source.prefix().join(from),
            self.source.backend().label()
        );

        if self
            .destination
            .backend()
            .exists(to)
            .map_err(|e| e.with_prefix(self.destination.prefix()))?
        {
            return Err(Error::rejected(
                &self.destination.prefix().join(to),
                "already exists",
            ));
        }

        self.source
            .backend()
            .get(from, &GetOptions::default())
            .map_err(|e| e.with_prefix(self.source.prefix()))
    }

    fn write(&self, model: &Entry, to: &Path) -> Result<Entry, Error> {
        log::debug!(
            "move write: '{}' to {} backend",
            self.destination.prefix().join(to),
            self.destination.backend().label()
        );

        let written = self
            .destination
            .backend()
            .save(model, to)
            .map_err(|e| e.with_prefix(self.destination.prefix()))?;

        if let Some(children) = model.listing() {
            for child in children {
                self.copy_tree(&child.path, &to.child(&child.name)?)?;
            }
        }

        Ok(written)
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> Result<(), Error> {
        let model = self
            .source
            .backend()
            .get(from, &GetOptions::default())
            .map_err(|e| e.with_prefix(self.source.prefix()))?;
        self.write(&model, to).map(|_| ())
    }

    /// Best-effort removal of a partially written destination.
    fn discard_destination(&self, to: &Path) {
        let external = self.destination.prefix().join(to);
        match self.destination.backend().delete(to) {
            Ok(()) => log::debug!("move write failed, removed partial copy at '{}'", external),
            Err(e) if e.is_not_found() => {}
            Err(e) => log::warn!(
                "could not remove partial copy at '{}': {}",
                external,
                e.with_prefix(self.destination.prefix())
            ),
        }
    }

    fn delete_source(&self, from: &Path) -> Result<(), Error> {
        log::debug!("move delete-source: '{}'", self.source.prefix().join(from));
        self.source
            .backend()
            .delete(from)
            .map_err(|e| e.with_prefix(self.source.prefix()))
    }
}
