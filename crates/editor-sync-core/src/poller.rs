//! Browser poll loop.
//!
//! Periodically samples every tracked editor and reports the ones whose value
//! differs from the synchronizer's cache. It never updates the cache itself:
//! a diff stays visible until the synchronizer has reconciled it.

use crate::binding::Bindings;
use crate::editor::RemoteEditor;
use crate::error::Result;
use crate::event::{ChangeEvent, Origin};
use crate::queue::EventSender;
use crate::state::RemoteCacheReader;
use crate::transport::ScriptEvaluator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

pub struct BrowserPoller<E> {
    bindings: Arc<Bindings>,
    editor: Arc<RemoteEditor<E>>,
    cache: RemoteCacheReader,
    events: EventSender,
    period: Duration,
}

impl<E: ScriptEvaluator> BrowserPoller<E> {
    pub fn new(
        bindings: Arc<Bindings>,
        editor: Arc<RemoteEditor<E>>,
        cache: RemoteCacheReader,
        events: EventSender,
        period: Duration,
    ) -> Self {
        Self {
            bindings,
            editor,
            cache,
            events,
            period,
        }
    }

    /// Sample every editor once, in ascending index order.
    ///
    /// Returns the number of change events emitted.
    pub async fn poll_once(&self) -> Result<usize> {
        let mut emitted = 0;
        for tracked in self.bindings.iter() {
            let index = tracked.editor_index;
            let code = self.editor.get_value(index).await?;
            if !self.cache.matches(index, &code) {
                debug!("Browser change detected: idx = {}", index);
                self.events.push(ChangeEvent::now(Origin::RemoteEditor, index));
                emitted += 1;
            }
        }
        Ok(emitted)
    }

    /// Poll forever, sleeping `period` after each cycle.
    ///
    /// A failed remote call ends the loop with that error.
    pub async fn run(self) -> Result<()> {
        loop {
            if let Err(e) = self.poll_once().await {
                error!("Browser poll failed: {}", e);
                return Err(e);
            }
            tokio::time::sleep(self.period).await;
        }
    }
}
