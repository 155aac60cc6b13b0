//! Engine-level error type.

use crate::fs::FsError;
use crate::transport::TransportError;
use thiserror::Error;

/// Errors that stop the poll loop or the synchronizer.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Remote call failed: {0}")]
    Transport(#[from] TransportError),

    #[error("File I/O failed: {0}")]
    Fs(#[from] FsError),

    #[error("No tracked file bound to editor index {0}")]
    UnknownIndex(usize),
}

pub type Result<T> = std::result::Result<T, SyncError>;
