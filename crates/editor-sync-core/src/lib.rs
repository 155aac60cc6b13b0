//! editor-sync-core: Bidirectional sync between local files and in-page code editors.
//!
//! This crate provides the transport-agnostic engine:
//! - Binding tracked files to editor indices
//! - Change events and the queue between producers and the consumer
//! - The remote editor adapter over a script `evaluate` seam
//! - The browser poll loop and the synchronizer with per-index debounce
//! - FileSystem and ScriptEvaluator trait abstractions

pub mod binding;
pub mod config;
pub mod editor;
pub mod error;
pub mod escape;
pub mod event;
pub mod fs;
pub mod page;
pub mod poller;
pub mod queue;
pub mod state;
pub mod synchronizer;
pub mod transport;

pub use binding::{Bindings, BindingError, TrackedIndex};
pub use config::{ConfigError, QueueOrder, SyncConfig};
pub use editor::RemoteEditor;
pub use error::SyncError;
pub use event::{ChangeEvent, Origin};
pub use fs::{FileSystem, FsError, InMemoryFs};
pub use page::InMemoryPage;
pub use poller::BrowserPoller;
pub use queue::{event_queue, EventReceiver, EventSender};
pub use state::{RemoteCache, RemoteCacheReader};
pub use synchronizer::{Outcome, Synchronizer};
pub use transport::{ScriptEvaluator, TransportError};
