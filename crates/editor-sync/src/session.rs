//! syncfolder: keep a set of files and the page's editors in sync.
//!
//! Wires the two producers (folder watcher, browser poll loop) to the single
//! consumer (synchronizer) through one event queue.

use crate::native_fs::NativeFs;
use crate::watcher::FolderWatcher;
use anyhow::{anyhow, Result};
use editor_sync_core::{
    event_queue, Bindings, BrowserPoller, RemoteEditor, ScriptEvaluator, SyncConfig, SyncError,
    Synchronizer,
};
use std::path::Path;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

/// A running sync session.
///
/// Dropping it without `stop` leaves the tasks running until the runtime
/// shuts down.
pub struct Session {
    watcher: FolderWatcher,
    poll_task: JoinHandle<Result<(), SyncError>>,
    sync_task: JoinHandle<Result<(), SyncError>>,
}

impl Session {
    /// Start watching `folder` and polling the page for the files in
    /// `bindings`. Must be called inside a tokio runtime.
    pub fn start<E: ScriptEvaluator + 'static>(
        editor: Arc<RemoteEditor<E>>,
        folder: &Path,
        bindings: Bindings,
        config: &SyncConfig,
    ) -> Result<Self> {
        let bindings = Arc::new(bindings);
        let (events, queue) = event_queue(config.queue_order);

        let synchronizer = Synchronizer::new(
            Arc::clone(&bindings),
            Arc::clone(&editor),
            NativeFs::new(),
            config.debounce_window,
        );
        let poller = BrowserPoller::new(
            Arc::clone(&bindings),
            editor,
            synchronizer.cache_reader(),
            events.clone(),
            config.poll_period,
        );
        let watcher = FolderWatcher::new(folder, bindings, events, config.watch_coalesce)?;

        let poll_task = tokio::spawn(poller.run());
        let sync_task = tokio::spawn(synchronizer.run(queue));

        Ok(Self {
            watcher,
            poll_task,
            sync_task,
        })
    }

    /// Wait until the poll loop or the synchronizer stops.
    ///
    /// Both run forever unless a remote call or file operation fails, so this
    /// normally returns that failure.
    pub async fn wait(&mut self) -> Result<()> {
        tokio::select! {
            result = &mut self.sync_task => task_result("synchronizer", result),
            result = &mut self.poll_task => task_result("browser poller", result),
        }
    }

    /// Abort both tasks and stop watching.
    pub fn stop(self) {
        self.poll_task.abort();
        self.sync_task.abort();
        info!("Stopped watching {}", self.watcher.folder().display());
    }
}

fn task_result(
    name: &str,
    result: std::result::Result<Result<(), SyncError>, JoinError>,
) -> Result<()> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(anyhow!("{} stopped: {}", name, e)),
        Err(e) => Err(anyhow!("{} task failed: {}", name, e)),
    }
}

/// Run a session until Ctrl+C or the first failure.
pub async fn sync_folder<E: ScriptEvaluator + 'static>(
    editor: Arc<RemoteEditor<E>>,
    folder: &Path,
    bindings: Bindings,
    config: &SyncConfig,
) -> Result<()> {
    let files: Vec<_> = bindings.iter().map(|t| t.path.display().to_string()).collect();
    info!("Synchronizing files {:?} in folder {}", files, folder.display());

    let mut session = Session::start(editor, folder, bindings, config)?;

    let result = tokio::select! {
        result = session.wait() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    };

    session.stop();
    result
}
