//! Mapping external paths to (mount prefix, internal path).

use hybridfs_contents::{Path, PathError};

use crate::path_trie::PathTrie;

/// Where an external path lands: the owning mount's prefix and the path
/// relative to that mount's backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub prefix: Path,
    pub internal: Path,
}

impl Resolution {
    /// The external path this resolution came from.
    pub fn external(&self) -> Path {
        self.prefix.join(&self.internal)
    }

    /// True when the path names the root of its mount.
    pub fn is_mount_root(&self) -> bool {
        self.internal.is_empty()
    }
}

/// Longest-prefix resolution over a fixed set of mount prefixes.
///
/// The empty prefix is always registered, so resolution never fails once a
/// path has been normalized. No I/O happens here.
#[derive(Debug, Clone)]
pub struct PathResolver {
    prefixes: PathTrie<()>,
}

impl PathResolver {
    /// Build a resolver for the given prefixes. The default prefix is added
    /// whether or not it is listed.
    pub fn new<I>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = Path>,
    {
        let mut trie = PathTrie::new();
        trie.insert(&Path::root(), ());
        for prefix in prefixes {
            trie.insert(&prefix, ());
        }
        Self { prefixes: trie }
    }

    /// Normalize an external path string.
    pub fn normalize(external: &str) -> Result<Path, PathError> {
        Path::parse(external)
    }

    /// Resolve a normalized external path.
    pub fn resolve(&self, external: &Path) -> Resolution {
        let depth = self
            .prefixes
            .find_ancestor(external)
            .map(|(_, depth)| depth)
            .unwrap_or(0);

        Resolution {
            prefix: Path {
                components: external.components[..depth].to_vec(),
            },
            internal: Path {
                components: external.components[depth..].to_vec(),
            },
        }
    }

    /// Normalize then resolve an external path string.
    pub fn resolve_str(&self, external: &str) -> Result<Resolution, PathError> {
        Ok(self.resolve(&Self::normalize(external)?))
    }

    /// True if `path` is exactly a registered prefix, the default included.
    pub fn is_prefix(&self, path: &Path) -> bool {
        self.prefixes.contains_value(path)
    }
}
