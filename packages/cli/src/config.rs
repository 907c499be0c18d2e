//! Locating and loading the mount table.
//!
//! The first of these wins:
//! 1. `--config FILE`
//! 2. the `HYBRIDFS_CONFIG` environment variable
//! 3. `<config dir>/hybridfs/mounts.json`, if it exists
//!
//! With none of them the router gets a single in-memory default mount.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use hybridfs_backends::DefaultBackendFactory;
use hybridfs_contents::RouterConfig;
use hybridfs_router::Router;

use crate::CliError;

pub const CONFIG_ENV: &str = "HYBRIDFS_CONFIG";

/// `<config dir>/hybridfs/mounts.json` for the current user.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hybridfs").join("mounts.json"))
}

/// Pick the configuration file to load, if any.
pub fn locate(
    explicit: Option<&Path>,
    env: Option<OsString>,
    default: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env.filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(value));
    }
    default.filter(|p| p.is_file())
}

/// Load the configuration chosen by [`locate`].
pub fn load(explicit: Option<&Path>) -> Result<RouterConfig, CliError> {
    match locate(explicit, std::env::var_os(CONFIG_ENV), default_config_path()) {
        Some(path) => {
            log::info!("loading mounts from {}", path.display());
            Ok(RouterConfig::load(&path)?)
        }
        None => {
            log::info!("no mount configuration found, using a single in-memory mount");
            Ok(RouterConfig::in_memory())
        }
    }
}

pub fn build_router(config: &RouterConfig) -> Result<Router, CliError> {
    Ok(Router::from_config(config, &DefaultBackendFactory)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn explicit_path_wins() {
        let chosen = locate(
            Some(Path::new("/a.json")),
            Some(OsString::from("/b.json")),
            None,
        );
        assert_eq!(chosen, Some(PathBuf::from("/a.json")));
    }

    #[test]
    fn environment_beats_default() {
        let chosen = locate(None, Some(OsString::from("/b.json")), Some("/c.json".into()));
        assert_eq!(chosen, Some(PathBuf::from("/b.json")));
        let chosen = locate(None, Some(OsString::new()), None);
        assert_eq!(chosen, None);
    }

    #[test]
    fn default_is_used_only_if_present() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mounts.json");
        assert_eq!(locate(None, None, Some(file.clone())), None);
        fs::write(&file, "{}").unwrap();
        assert_eq!(locate(None, None, Some(file.clone())), Some(file));
    }

    #[test]
    fn builds_router_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        let file = dir.path().join("mounts.json");
        let config = serde_json::json!({
            "mounts": {
                "": {"type": "memory"},
                "data": {"type": "local", "path": data.display().to_string()}
            }
        });
        fs::write(&file, config.to_string()).unwrap();

        let router = build_router(&load(Some(&file)).unwrap()).unwrap();
        assert_eq!(router.mounts().count(), 2);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(load(Some(Path::new("/no/such/mounts.json"))).is_err());
    }
}
