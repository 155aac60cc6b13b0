//! FileSystem trait abstraction for reading and writing tracked files.
//!
//! Implementations:
//! - `InMemoryFs` - For testing
//! - `NativeFs` (in editor-sync) - Uses tokio::fs
//!
//! Tracked files are always read and written whole, as UTF-8 text.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("IO error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, FsError>;

/// Whole-file text I/O on absolute paths.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read the full contents of a file
    async fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the full contents of a file, creating it if missing
    async fn write(&self, path: &Path, content: &str) -> Result<()>;
}

/// In-memory filesystem for testing
#[derive(Default)]
pub struct InMemoryFs {
    files: RwLock<HashMap<PathBuf, String>>,
    /// Number of writes per path, to assert how often a file was touched
    writes: RwLock<HashMap<PathBuf, usize>>,
}

impl InMemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set file contents without counting it as a write.
    pub fn insert(&self, path: impl Into<PathBuf>, content: &str) {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(path.into(), content.to_string());
    }

    /// Current contents, if the file exists.
    pub fn contents(&self, path: &Path) -> Option<String> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files.get(path).cloned()
    }

    /// How many times `write` touched this path.
    pub fn write_count(&self, path: &Path) -> usize {
        let writes = self.writes.read().unwrap_or_else(|e| e.into_inner());
        writes.get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl FileSystem for InMemoryFs {
    async fn read_to_string(&self, path: &Path) -> Result<String> {
        self.contents(path)
            .ok_or_else(|| FsError::NotFound(path.display().to_string()))
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.insert(path, content);
        let mut writes = self.writes.write().unwrap_or_else(|e| e.into_inner());
        *writes.entry(path.to_path_buf()).or_insert(0) += 1;
        Ok(())
    }
}

// Implement FileSystem for Arc<T> where T: FileSystem
// This allows a test to inspect the filesystem it handed to the synchronizer
#[async_trait]
impl<T: FileSystem + ?Sized> FileSystem for std::sync::Arc<T> {
    async fn read_to_string(&self, path: &Path) -> Result<String> {
        (**self).read_to_string(path).await
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        (**self).write(path, content).await
    }
}
