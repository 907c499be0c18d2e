//! Generated names for new and copied entries.

use hybridfs_contents::{Entry, EntryKind, Error, Path};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;

pub const UNTITLED_NOTEBOOK: &str = "Untitled";
pub const UNTITLED_FILE: &str = "untitled";
pub const UNTITLED_DIRECTORY: &str = "Untitled Folder";

/// The first-choice name for a new entry of `kind`.
pub fn untitled_name(kind: EntryKind, ext: Option<&str>) -> String {
    match kind {
        EntryKind::Directory => UNTITLED_DIRECTORY.to_string(),
        EntryKind::Notebook => format!("{}.ipynb", UNTITLED_NOTEBOOK),
        EntryKind::File => format!("{}{}", UNTITLED_FILE, ext.unwrap_or("")),
    }
}

/// An empty model of `kind`, ready to save.
pub fn untitled_model(kind: EntryKind) -> Entry {
    match kind {
        EntryKind::Directory => Entry::directory(Path::root()),
        EntryKind::Notebook => Entry::notebook(
            Path::root(),
            json!({
                "cells": [],
                "metadata": {},
                "nbformat": 4,
                "nbformat_minor": 5
            }),
        ),
        EntryKind::File => Entry::text_file(Path::root(), ""),
    }
}

/// Split a name into stem and suffix. Notebooks split at `.ipynb`; anything
/// else at its first dot, so `a.tar.gz` keeps `.tar.gz` together.
fn split_suffix(name: &str) -> (&str, &str) {
    if let Some(stem) = name.strip_suffix(".ipynb") {
        return (stem, ".ipynb");
    }
    match name.find('.') {
        Some(i) => (&name[..i], &name[i..]),
        None => (name, ""),
    }
}

/// The first of `name`, `<stem><insert>1<suffix>`, `<stem><insert>2<suffix>`, …
/// for which `taken` returns false.
pub fn increment_name<F>(name: &str, insert: &str, mut taken: F) -> Result<String, Error>
where
    F: FnMut(&str) -> Result<bool, Error>,
{
    let (stem, suffix) = split_suffix(name);
    let mut i: u64 = 0;
    loop {
        let candidate = if i == 0 {
            format!("{}{}", stem, suffix)
        } else {
            format!("{}{}{}{}", stem, insert, i, suffix)
        };
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        i += 1;
    }
}

/// The name a copy starts from: any `-CopyN` marker is dropped so copies
/// of copies do not accumulate markers.
pub fn copy_base_name(name: &str) -> String {
    lazy_static! {
        static ref COPY_MARKER: Regex = Regex::new(r"-Copy\d*\.").expect("valid copy pattern");
    }
    COPY_MARKER.replace(name, ".").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn taken(names: &[&str]) -> impl FnMut(&str) -> Result<bool, Error> {
        let set: HashSet<String> = names.iter().map(|s| s.to_string()).collect();
        move |candidate| Ok(set.contains(candidate))
    }

    #[test]
    fn untitled_names() {
        assert_eq!(untitled_name(EntryKind::Notebook, None), "Untitled.ipynb");
        assert_eq!(untitled_name(EntryKind::File, Some(".txt")), "untitled.txt");
        assert_eq!(untitled_name(EntryKind::File, None), "untitled");
        assert_eq!(untitled_name(EntryKind::Directory, Some(".x")), "Untitled Folder");
    }

    #[test]
    fn increments_until_free() {
        assert_eq!(
            increment_name("Untitled.ipynb", "", taken(&[])).unwrap(),
            "Untitled.ipynb"
        );
        assert_eq!(
            increment_name("Untitled.ipynb", "", taken(&["Untitled.ipynb", "Untitled1.ipynb"]))
                .unwrap(),
            "Untitled2.ipynb"
        );
        assert_eq!(
            increment_name("Untitled Folder", "", taken(&["Untitled Folder"])).unwrap(),
            "Untitled Folder1"
        );
    }

    #[test]
    fn suffix_splits_at_first_dot_except_notebooks() {
        assert_eq!(
            increment_name("data.tar.gz", "", taken(&["data.tar.gz"])).unwrap(),
            "data1.tar.gz"
        );
        assert_eq!(
            increment_name("v1.2.ipynb", "", taken(&["v1.2.ipynb"])).unwrap(),
            "v1.21.ipynb"
        );
    }

    #[test]
    fn copy_names() {
        assert_eq!(copy_base_name("foo-Copy3.ipynb"), "foo.ipynb");
        assert_eq!(copy_base_name("foo.ipynb"), "foo.ipynb");
        assert_eq!(
            increment_name(&copy_base_name("foo-Copy1.ipynb"), "-Copy", taken(&["foo.ipynb", "foo-Copy1.ipynb"]))
                .unwrap(),
            "foo-Copy2.ipynb"
        );
    }

    #[test]
    fn errors_from_existence_check_propagate() {
        let result = increment_name("x", "", |_| Err(Error::bad_request("offline")));
        assert!(result.is_err());
    }

    #[test]
    fn untitled_models() {
        assert_eq!(untitled_model(EntryKind::File).text(), Some(""));
        assert_eq!(untitled_model(EntryKind::Notebook).document().unwrap()["nbformat"], 4);
        assert!(untitled_model(EntryKind::Directory).content.is_none());
    }
}
