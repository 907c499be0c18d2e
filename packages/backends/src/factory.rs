//! Backend construction from mount configuration.

use std::path::PathBuf;
use std::sync::Arc;

use hybridfs_contents::{BackendFactory, BackendRef, Error, MountConfig, Path};

use crate::{InMemoryBackend, LocalDiskBackend};

/// Creates the backends shipped in this crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBackendFactory;

impl BackendFactory for DefaultBackendFactory {
    fn create(&self, prefix: &Path, config: &MountConfig) -> Result<BackendRef, Error> {
        match config {
            MountConfig::Memory => Ok(Arc::new(InMemoryBackend::new())),
            MountConfig::Local { path } => {
                let backend = LocalDiskBackend::new(PathBuf::from(path)).map_err(|e| {
                    Error::MountTable {
                        message: format!(
                            "failed to open local directory '{}' for mount '{}': {}",
                            path, prefix, e
                        ),
                    }
                })?;
                Ok(Arc::new(backend))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybridfs_contents::{path, Backend};

    #[test]
    fn creates_memory_backends() {
        let backend = DefaultBackendFactory
            .create(&Path::root(), &MountConfig::Memory)
            .unwrap();
        assert_eq!(backend.label(), "memory");
    }

    #[test]
    fn creates_local_backends() {
        let dir = tempfile::tempdir().unwrap();
        let config = MountConfig::Local {
            path: dir.path().display().to_string(),
        };
        let backend = DefaultBackendFactory.create(&path!("disk"), &config).unwrap();
        assert_eq!(backend.label(), "local");
    }

    #[test]
    fn bad_local_path_names_the_mount() {
        let config = MountConfig::Local {
            path: "/definitely/not/here".to_string(),
        };
        let err = DefaultBackendFactory
            .create(&path!("disk"), &config)
            .err().unwrap();
        assert!(matches!(err, Error::MountTable { .. }));
        assert!(err.to_string().contains("'disk'"));
    }
}
