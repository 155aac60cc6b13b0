//! Native filesystem implementation using tokio::fs.

use async_trait::async_trait;
use editor_sync_core::fs::{FileSystem, FsError, Result};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Native filesystem implementation for tracked files
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFs;

impl NativeFs {
    pub fn new() -> Self {
        Self
    }
}

fn map_err(path: &Path, e: std::io::Error) -> FsError {
    match e.kind() {
        ErrorKind::NotFound => FsError::NotFound(path.display().to_string()),
        ErrorKind::InvalidData => FsError::InvalidUtf8(path.display().to_string()),
        _ => FsError::Io(format!("{}: {}", path.display(), e)),
    }
}

#[async_trait]
impl FileSystem for NativeFs {
    async fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).await.map_err(|e| map_err(path, e))
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).await.map_err(|e| map_err(path, e))
    }
}
