//! A prefix trie keyed by path components.
//!
//! Mount prefixes are stored here so the deepest registered prefix of a
//! path is found in one walk of its components.

use std::collections::BTreeMap;

use hybridfs_contents::Path;

/// A prefix trie keyed by path components.
///
/// # Example
///
/// ```rust
/// use hybridfs_router::PathTrie;
/// use hybridfs_contents::path;
///
/// let mut trie: PathTrie<&str> = PathTrie::new();
/// trie.insert(&path!("team"), "team");
/// trie.insert(&path!("team/shared"), "shared");
///
/// let (mount, depth) = trie.find_ancestor(&path!("team/shared/notes.txt")).unwrap();
/// assert_eq!(*mount, "shared");
/// assert_eq!(depth, 2);
/// ```
#[derive(Debug, Clone)]
pub struct PathTrie<T> {
    value: Option<T>,
    children: BTreeMap<String, PathTrie<T>>,
}

impl<T> Default for PathTrie<T> {
    fn default() -> Self {
        Self {
            value: None,
            children: BTreeMap::new(),
        }
    }
}

impl<T> PathTrie<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` at `path`, returning what was there before.
    pub fn insert(&mut self, path: &Path, value: T) -> Option<T> {
        let node = path
            .components
            .iter()
            .fold(self, |node, component| {
                node.children.entry(component.clone()).or_default()
            });
        node.value.replace(value)
    }

    /// True if a value is stored at exactly `path`.
    pub fn contains_value(&self, path: &Path) -> bool {
        let mut node = self;
        for component in &path.components {
            match node.children.get(component) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.value.is_some()
    }

    /// The value stored at the deepest ancestor of `path` (inclusive), and
    /// how many components of `path` that ancestor spans.
    pub fn find_ancestor(&self, path: &Path) -> Option<(&T, usize)> {
        let mut node = self;
        let mut deepest = self.value.as_ref().map(|v| (v, 0));

        for (depth, component) in path.components.iter().enumerate() {
            let Some(child) = node.children.get(component) else {
                break;
            };
            node = child;
            if let Some(value) = node.value.as_ref() {
                deepest = Some((value, depth + 1));
            }
        }

        deepest
    }
}
