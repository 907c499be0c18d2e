//! hybridfs: one contents namespace federated over several mounted storage backends.
//!
//! Each backend owns the subtree under a path prefix. Operations on paths are
//! routed to the backend with the longest matching prefix, and results come
//! back in the unified namespace.

pub use hybridfs_backends as backends;
pub use hybridfs_contents as contents;
pub use hybridfs_router as router;

pub use hybridfs_backends::{DefaultBackendFactory, InMemoryBackend, LocalDiskBackend};
pub use hybridfs_contents::{
    Backend, BackendRef, Entry, EntryKind, Error, Format, GetOptions, Path, RouterConfig,
};
pub use hybridfs_router::{MountRegistry, Router};
