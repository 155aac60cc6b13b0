//! editor-sync library: Native adapters around editor-sync-core.
//!
//! Exposes the DevTools client, folder watcher and session wiring so the
//! binary and the integration tests share them.

pub mod commands;
pub mod config;
pub mod devtools;
pub mod message;
pub mod native_fs;
pub mod session;
pub mod watcher;

// Re-export key types for convenience
pub use commands::FileArg;
pub use config::{Config, ConfigError, DevToolsEndpoint};
pub use devtools::DevToolsClient;
pub use native_fs::NativeFs;
pub use session::Session;
pub use watcher::FolderWatcher;
