//! Reference contents backends: an in-memory table and a local directory.

pub mod codec;
pub mod factory;
pub mod in_memory;
pub mod local_disk;

pub use factory::DefaultBackendFactory;
pub use in_memory::InMemoryBackend;
pub use local_disk::LocalDiskBackend;
