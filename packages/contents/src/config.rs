//! Mount table configuration.
//!
//! A router is configured with a JSON object mapping prefixes to backend
//! configurations. The empty prefix is the default mount:
//!
//! ```json
//! {
//!   "mounts": {
//!     "": {"type": "local", "path": "/srv/notebooks"},
//!     "scratch": {"type": "memory"}
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{BackendRef, Error, Path};

/// Configuration for one mounted backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MountConfig {
    /// In-memory table, lost on exit
    Memory,
    /// Local directory
    Local { path: String },
}

/// The full mount table configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouterConfig {
    pub mounts: BTreeMap<String, MountConfig>,
}

impl RouterConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s).map_err(|e| Error::MountTable {
            message: format!("malformed configuration: {}", e),
        })
    }

    /// Load a configuration file.
    pub fn load(file: &std::path::Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(file).map_err(|e| Error::MountTable {
            message: format!("cannot read {}: {}", file.display(), e),
        })?;
        Self::from_json_str(&text)
    }

    /// A single in-memory default mount.
    pub fn in_memory() -> Self {
        let mut mounts = BTreeMap::new();
        mounts.insert(String::new(), MountConfig::Memory);
        Self { mounts }
    }
}

/// A factory for creating backends from mount configurations.
pub trait BackendFactory: Send + Sync {
    fn create(&self, prefix: &Path, config: &MountConfig) -> Result<BackendRef, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_tagged_mounts() {
        let config = RouterConfig::from_json_str(
            r#"{"mounts": {"": {"type": "local", "path": "/tmp/nb"}, "A": {"type": "memory"}}}"#,
        )
        .unwrap();

        assert_eq!(config.mounts.len(), 2);
        assert_eq!(
            config.mounts[""],
            MountConfig::Local {
                path: "/tmp/nb".to_string()
            }
        );
        assert_eq!(config.mounts["A"], MountConfig::Memory);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = RouterConfig::from_json_str(r#"{"mounts": {"": {"type": "postgres"}}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::MountTable { .. }));
    }

    #[test]
    fn missing_path_is_rejected() {
        assert!(RouterConfig::from_json_str(r#"{"mounts": {"": {"type": "local"}}}"#).is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mounts": {{"": {{"type": "memory"}}}}}}"#).unwrap();

        let config = RouterConfig::load(file.path()).unwrap();
        assert_eq!(config, RouterConfig::in_memory());
    }

    #[test]
    fn load_missing_file_fails() {
        let err = RouterConfig::load(std::path::Path::new("/nonexistent/mounts.json"));
        assert!(err.is_err());
    }
}
