//! Federation of contents backends under one namespace.
//!
//! A [`MountRegistry`] maps path prefixes to backends. A [`Router`] resolves
//! every external path to the mount with the longest matching prefix,
//! forwards the operation with the prefix stripped, and rebases results and
//! errors back under the prefix.
//!
//! ```
//! use std::sync::Arc;
//! use hybridfs_contents::{BackendRef, Entry, GetOptions, Path};
//! use hybridfs_backends::InMemoryBackend;
//! use hybridfs_router::{MountRegistry, Router};
//!
//! let mounts: Vec<(&str, BackendRef)> = vec![
//!     ("", Arc::new(InMemoryBackend::new())),
//!     ("scratch", Arc::new(InMemoryBackend::new())),
//! ];
//! let router = Router::new(MountRegistry::new(mounts).unwrap());
//!
//! router.save(&Entry::text_file(Path::root(), "hi"), "scratch/note.txt").unwrap();
//! let entry = router.get("scratch/note.txt", &GetOptions::default()).unwrap();
//! assert_eq!(entry.text(), Some("hi"));
//! ```

pub mod mover;
pub mod naming;
pub mod path_trie;
pub mod registry;
pub mod resolver;
pub mod root;
pub mod router;

pub use mover::{CrossBackendMover, MoveFailure, MoveStep};
pub use path_trie::PathTrie;
pub use registry::{Mount, MountRegistry};
pub use resolver::{PathResolver, Resolution};
pub use root::RootAggregator;
pub use router::Router;
