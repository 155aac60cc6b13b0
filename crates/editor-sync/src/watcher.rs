//! Folder watcher producing LocalFile change events.
//!
//! Uses notify-debouncer-mini to coalesce bursts of raw notifications (an
//! editor save often produces several), then keeps only tracked files.

use anyhow::Result;
use editor_sync_core::{Bindings, ChangeEvent, EventSender, Origin};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Watches a folder and pushes an event for every change to a tracked file.
pub struct FolderWatcher {
    /// Watched folder, canonicalized
    folder: PathBuf,
    /// Debouncer handle (must keep alive)
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
}

impl FolderWatcher {
    /// Start watching `folder` recursively.
    ///
    /// Notifications are coalesced over `coalesce` before being filtered.
    pub fn new(
        folder: &Path,
        bindings: Arc<Bindings>,
        events: EventSender,
        coalesce: Duration,
    ) -> Result<Self> {
        // Canonicalize the path to resolve symlinks. On macOS, /var/folders/...
        // is actually /private/var/folders/..., and FSEvents needs the real path.
        let folder = folder.canonicalize().unwrap_or_else(|_| folder.to_path_buf());

        let mut debouncer = new_debouncer(
            coalesce,
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(batch) => {
                    for event in batch {
                        if let Some(change) = Self::process_event(&event, &bindings) {
                            events.push(change);
                        }
                    }
                }
                Err(e) => {
                    error!("Folder watcher error: {}", e);
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(&folder, RecursiveMode::Recursive)?;
        info!("Watching {}", folder.display());

        Ok(Self {
            folder,
            _debouncer: debouncer,
        })
    }

    /// Turn a notification into a change event if it concerns a tracked file.
    fn process_event(event: &DebouncedEvent, bindings: &Bindings) -> Option<ChangeEvent> {
        let index = tracked_index(&event.path, bindings)?;

        // A rename-save can leave the path briefly missing; the follow-up
        // notification carries the new content.
        if !event.path.exists() {
            debug!("Skipping vanished file: {}", event.path.display());
            return None;
        }

        debug!("Event detected: path = {} | idx = {}", event.path.display(), index);
        Some(ChangeEvent::now(Origin::LocalFile, index))
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

/// Editor index for a notified path, if the path is tracked.
pub fn tracked_index(path: &Path, bindings: &Bindings) -> Option<usize> {
    bindings.index_of(path)
}
