//! The immutable prefix → backend table.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use hybridfs_contents::{Backend, BackendFactory, BackendRef, Error, Path, RouterConfig};

use crate::resolver::{PathResolver, Resolution};

/// A backend claiming the subtree under `prefix`.
#[derive(Clone)]
pub struct Mount {
    prefix: Path,
    backend: BackendRef,
}

impl Mount {
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// True for the mount registered under the empty prefix.
    pub fn is_default(&self) -> bool {
        self.prefix.is_empty()
    }

    /// True when both mounts are served by the same backend instance, so
    /// their internal paths live in one namespace.
    pub fn shares_backend_with(&self, other: &Mount) -> bool {
        Arc::ptr_eq(&self.backend, &other.backend)
    }
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("prefix", &self.prefix.to_string())
            .field("backend", &self.backend.label())
            .finish()
    }
}

/// The mount table, fixed at construction.
///
/// Construction fails if there is no default (`""`) mount, or if two
/// configured prefixes normalize to the same path (`"A"` and `"/A/"`).
#[derive(Debug)]
pub struct MountRegistry {
    default: Mount,
    others: BTreeMap<Path, Mount>,
    resolver: PathResolver,
}

impl MountRegistry {
    /// Build the table from (prefix, backend) pairs.
    pub fn new<I, S>(mounts: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (S, BackendRef)>,
        S: AsRef<str>,
    {
        let mut seen: BTreeMap<Path, String> = BTreeMap::new();
        let mut default = None;
        let mut others = BTreeMap::new();

        for (raw, backend) in mounts {
            let raw = raw.as_ref();
            let prefix = Path::parse(raw).map_err(|e| Error::MountTable {
                message: format!("invalid mount prefix '{}': {}", raw, e),
            })?;

            if let Some(previous) = seen.insert(prefix.clone(), raw.to_string()) {
                return Err(Error::MountTable {
                    message: format!(
                        "mount prefixes '{}' and '{}' both normalize to '{}'",
                        previous, raw, prefix
                    ),
                });
            }

            log::info!("mounting {} backend at '{}'", backend.label(), prefix);
            let mount = Mount {
                prefix: prefix.clone(),
                backend,
            };
            if prefix.is_empty() {
                default = Some(mount);
            } else {
                others.insert(prefix, mount);
            }
        }

        let default = default.ok_or_else(|| Error::MountTable {
            message: "no default mount registered under the empty prefix".to_string(),
        })?;
        let resolver = PathResolver::new(others.keys().cloned());

        Ok(Self {
            default,
            others,
            resolver,
        })
    }

    /// Build the table from configuration, creating each backend through
    /// `factory`.
    pub fn from_config(config: &RouterConfig, factory: &dyn BackendFactory) -> Result<Self, Error> {
        let mut mounts = Vec::with_capacity(config.mounts.len());
        for (raw, mount_config) in &config.mounts {
            let prefix = Path::parse(raw).map_err(|e| Error::MountTable {
                message: format!("invalid mount prefix '{}': {}", raw, e),
            })?;
            mounts.push((raw.as_str(), factory.create(&prefix, mount_config)?));
        }
        Self::new(mounts)
    }

    /// The mount registered at exactly `prefix`.
    pub fn lookup(&self, prefix: &Path) -> Result<&Mount, Error> {
        if prefix.is_empty() {
            return Ok(&self.default);
        }
        self.others.get(prefix).ok_or_else(|| Error::UnknownMount {
            prefix: prefix.clone(),
        })
    }

    pub fn default_mount(&self) -> &Mount {
        &self.default
    }

    /// Every mount, default first, the rest in prefix order.
    pub fn all_mounts(&self) -> impl Iterator<Item = &Mount> {
        std::iter::once(&self.default).chain(self.others.values())
    }

    /// Every mount except the default, in prefix order.
    pub fn non_default_mounts(&self) -> impl Iterator<Item = &Mount> {
        self.others.values()
    }

    pub fn len(&self) -> usize {
        self.others.len() + 1
    }

    /// Always false; the default mount is mandatory.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Resolve an external path to its owning mount.
    pub fn resolve(&self, external: &Path) -> Result<(&Mount, Resolution), Error> {
        let resolution = self.resolver.resolve(external);
        let mount = self.lookup(&resolution.prefix)?;
        Ok((mount, resolution))
    }

    /// True if `path` is the unified root or exactly a mount prefix.
    pub fn is_mount_root(&self, path: &Path) -> bool {
        self.resolver.is_prefix(path)
    }
}
