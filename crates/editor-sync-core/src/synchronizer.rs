//! The single consumer of change events.
//!
//! For each event the synchronizer decides between pull (editor -> file) and
//! push (file -> editor), performs the I/O, and records what it did so the
//! echo of its own action is not treated as a new change:
//! - the cached remote value is refreshed after every pull and push, so the
//!   next poll cycle sees no diff
//! - the per-index last-action time suppresses events that arrive within the
//!   debounce window, such as the watcher noticing the file we just wrote
//!
//! It is the only writer of tracked files and the only caller of `set_value`.

use crate::binding::Bindings;
use crate::editor::RemoteEditor;
use crate::error::{Result, SyncError};
use crate::event::{ChangeEvent, Origin};
use crate::fs::FileSystem;
use crate::queue::EventReceiver;
use crate::state::{RemoteCache, RemoteCacheReader};
use crate::transport::ScriptEvaluator;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// What `apply` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Dropped: too close to the last applied action for its index
    Debounced,
    /// Editor value written to the file
    Pulled,
    /// File contents pushed to the editor
    Pushed,
}

pub struct Synchronizer<E, F> {
    bindings: Arc<Bindings>,
    editor: Arc<RemoteEditor<E>>,
    fs: F,
    cache: RemoteCache,
    /// When an event was last applied, per index
    last_action: Vec<Option<Instant>>,
    debounce_window: Duration,
}

impl<E: ScriptEvaluator, F: FileSystem> Synchronizer<E, F> {
    pub fn new(
        bindings: Arc<Bindings>,
        editor: Arc<RemoteEditor<E>>,
        fs: F,
        debounce_window: Duration,
    ) -> Self {
        let len = bindings.len();
        Self {
            bindings,
            editor,
            fs,
            cache: RemoteCache::new(len),
            last_action: vec![None; len],
            debounce_window,
        }
    }

    /// Read accessor for the poll loop.
    pub fn cache_reader(&self) -> RemoteCacheReader {
        self.cache.reader()
    }

    pub fn cached_value(&self, index: usize) -> Option<String> {
        self.cache.get(index)
    }

    pub fn last_action(&self, index: usize) -> Option<Instant> {
        self.last_action.get(index).copied().flatten()
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Whether `event` falls inside the debounce window of its index.
    ///
    /// Compares the event's detection time against the last applied action,
    /// not against when the event was queued: an old event popped late can be
    /// suppressed by a newer action on the same index.
    pub fn is_debounced(&self, event: &ChangeEvent) -> bool {
        self.last_action(event.index())
            .is_some_and(|last| last + self.debounce_window > event.timestamp())
    }

    /// Apply one event.
    pub async fn apply(&mut self, event: ChangeEvent) -> Result<Outcome> {
        let index = event.index();
        let path = self
            .bindings
            .path(index)
            .ok_or(SyncError::UnknownIndex(index))?
            .to_path_buf();

        if self.is_debounced(&event) {
            debug!("Debounced {:?} event for editor {}", event.origin(), index);
            return Ok(Outcome::Debounced);
        }

        let outcome = match event.origin() {
            Origin::RemoteEditor => {
                self.pull(index, &path).await?;
                Outcome::Pulled
            }
            Origin::LocalFile => {
                self.push(index, &path).await?;
                Outcome::Pushed
            }
        };

        self.last_action[index] = Some(Instant::now());
        Ok(outcome)
    }

    /// Editor -> file, then remember what the editor holds.
    async fn pull(&self, index: usize, path: &Path) -> Result<()> {
        let code = self.editor.get_value(index).await?;
        self.fs.write(path, &code).await?;
        info!("SYNC: Pulled editor {} into {}", index, path.display());
        debug!("Pulled code, idx = {} |\n{}", index, code);
        self.cache.store(index, code);
        Ok(())
    }

    /// File -> editor, let the editor settle, then re-read it.
    ///
    /// The re-read stores what the editor actually holds after any
    /// normalization, so the poll loop does not report the push back as a
    /// remote change.
    async fn push(&self, index: usize, path: &Path) -> Result<()> {
        let code = self.fs.read_to_string(path).await?;
        self.editor.set_value(index, &code).await?;
        tokio::time::sleep(self.debounce_window).await;

        let settled = self.editor.get_value(index).await?;
        info!("SYNC: Pushed {} into editor {}", path.display(), index);
        debug!("Pushed code, idx = {} |\n{}", index, settled);
        self.cache.store(index, settled);
        Ok(())
    }

    /// Consume events until the queue closes or an operation fails.
    pub async fn run(mut self, mut events: EventReceiver) -> Result<()> {
        while let Some(event) = events.pop().await {
            self.apply(event).await?;
        }
        debug!("Event queue closed, synchronizer stopping");
        Ok(())
    }
}
