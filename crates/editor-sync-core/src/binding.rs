//! Binding between tracked file paths and editor indices.
//!
//! The order of the file list given to a sync session defines the binding:
//! the first file is editor 0, the second editor 1, and so on. The set is
//! fixed for the lifetime of the session.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("No files to track")]
    Empty,

    #[error("File listed more than once: {0}")]
    Duplicate(String),
}

/// One (file path, editor index) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedIndex {
    /// Absolute, normalized file path
    pub path: PathBuf,
    /// Position of the editor among the page's editor widgets
    pub editor_index: usize,
}

/// The dense, ordered set of tracked files for a session.
#[derive(Debug, Clone)]
pub struct Bindings {
    entries: Vec<TrackedIndex>,
}

impl Bindings {
    /// Bind each path to its position in `paths`.
    pub fn new<I, P>(paths: I) -> Result<Self, BindingError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut entries: Vec<TrackedIndex> = Vec::new();
        for (editor_index, path) in paths.into_iter().enumerate() {
            let path = normalize_path(path.as_ref());
            if entries.iter().any(|e| e.path == path) {
                return Err(BindingError::Duplicate(path.display().to_string()));
            }
            entries.push(TrackedIndex { path, editor_index });
        }

        if entries.is_empty() {
            return Err(BindingError::Empty);
        }
        Ok(Self { entries })
    }

    /// Editor index bound to `path`, if the path is tracked.
    ///
    /// `path` is normalized before lookup.
    pub fn index_of(&self, path: &Path) -> Option<usize> {
        let path = normalize_path(path);
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.editor_index)
    }

    pub fn get(&self, editor_index: usize) -> Option<&TrackedIndex> {
        self.entries.get(editor_index)
    }

    /// Path bound to `editor_index`.
    pub fn path(&self, editor_index: usize) -> Option<&Path> {
        self.get(editor_index).map(|e| e.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedIndex> {
        self.entries.iter()
    }
}

/// Make `path` absolute and strip `.` and `..` lexically.
///
/// The parent directory is canonicalized when it exists so that paths
/// reported by the OS watcher (which resolves symlinks, e.g. `/var` ->
/// `/private/var` on macOS) compare equal to paths given on the command line.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other.as_os_str()),
        }
    }

    match (lexical.parent(), lexical.file_name()) {
        (Some(parent), Some(name)) => match parent.canonicalize() {
            Ok(real_parent) => real_parent.join(name),
            Err(_) => lexical,
        },
        _ => lexical,
    }
}
