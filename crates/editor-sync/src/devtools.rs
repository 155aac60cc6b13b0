//! Remote debugging client.
//!
//! Attaches to one browser tab over its DevTools WebSocket and runs scripts
//! with `Runtime.evaluate`. A read task routes each response to the caller
//! waiting on its `id`; protocol events are ignored.

use crate::config::DevToolsEndpoint;
use crate::message::{evaluate_request, response_id, select_page, TargetInfo, MAX_MESSAGE_SIZE};
use async_trait::async_trait;
use editor_sync_core::transport::{Result, ScriptEvaluator, TransportError};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Callers waiting for a response, by request id. `None` once the socket
/// has closed.
type Pending = Arc<Mutex<Option<HashMap<u64, oneshot::Sender<String>>>>>;

/// A connection to one tab's DevTools endpoint.
pub struct DevToolsClient {
    /// WebSocket URL we attached to
    url: String,
    /// Write half of the WebSocket
    write: tokio::sync::Mutex<SplitSink<WsStream, Message>>,
    pending: Pending,
    next_id: AtomicU64,
    /// Handle to the read task
    read_task: Option<JoinHandle<()>>,
}

impl DevToolsClient {
    /// Look up the configured tab on the browser's `/json` listing and attach
    /// to it.
    pub async fn discover(endpoint: &DevToolsEndpoint) -> Result<Self> {
        let listing_url = endpoint.json_url();
        let targets: Vec<TargetInfo> = reqwest::get(&listing_url)
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("{}: {}", listing_url, e)))?
            .json()
            .await
            .map_err(|e| TransportError::Other(format!("Bad target listing: {}", e)))?;

        let target = select_page(&targets, endpoint.tab).ok_or_else(|| {
            TransportError::TargetNotFound(format!(
                "no page #{} among {} target(s)",
                endpoint.tab,
                targets.len()
            ))
        })?;
        let ws_url = target.web_socket_debugger_url.as_deref().ok_or_else(|| {
            TransportError::TargetNotFound(format!(
                "page {} is already attached to another debugger",
                target.id
            ))
        })?;

        info!("Attaching to tab \"{}\" ({})", target.title, target.url);
        Self::connect(ws_url).await
    }

    /// Attach to a DevTools WebSocket URL directly.
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("{}: {}", url, e)))?;
        debug!("Connected to {}", url);

        let (write, read) = ws_stream.split();
        let pending: Pending = Arc::new(Mutex::new(Some(HashMap::new())));

        let read_url = url.to_string();
        let read_pending = Arc::clone(&pending);
        let read_task = tokio::spawn(async move {
            Self::read_loop(read_url, read, read_pending).await;
        });

        Ok(Self {
            url: url.to_string(),
            write: tokio::sync::Mutex::new(write),
            pending,
            next_id: AtomicU64::new(1),
            read_task: Some(read_task),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Read loop that hands responses to their waiting callers.
    async fn read_loop(url: String, mut read: SplitStream<WsStream>, pending: Pending) {
        loop {
            let text = match read.next().await {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                    Ok(text) => text,
                    Err(_) => {
                        warn!("Dropping non-UTF-8 binary frame from {}", url);
                        continue;
                    }
                },
                Some(Ok(Message::Close(_))) => {
                    debug!("Received close frame from {}", url);
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    match e {
                        WsError::ConnectionClosed | WsError::AlreadyClosed => {
                            debug!("Connection {} closed", url);
                        }
                        _ => {
                            error!("WebSocket error on {}: {}", url, e);
                        }
                    }
                    break;
                }
                None => {
                    debug!("Connection {} stream ended", url);
                    break;
                }
            };

            if text.len() > MAX_MESSAGE_SIZE {
                warn!(
                    "Message from {} exceeds max size ({} > {}), dropping",
                    url,
                    text.len(),
                    MAX_MESSAGE_SIZE
                );
                continue;
            }

            let Some(id) = response_id(&text) else {
                continue;
            };
            let waiter = pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .as_mut()
                .and_then(|waiting| waiting.remove(&id));
            match waiter {
                Some(tx) => {
                    let _ = tx.send(text);
                }
                None => debug!("Response {} from {} has no waiting caller", id, url),
            }
        }

        // Dropping the senders wakes every waiting caller with Closed
        pending.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    fn forget(&self, id: u64) {
        if let Some(waiting) = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_mut()
        {
            waiting.remove(&id);
        }
    }
}

#[async_trait]
impl ScriptEvaluator for DevToolsClient {
    async fn evaluate(&self, script: &str) -> Result<String> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            match pending.as_mut() {
                Some(waiting) => {
                    waiting.insert(id, tx);
                }
                None => return Err(TransportError::Closed),
            }
        }

        let request = evaluate_request(id, script);
        let sent = {
            let mut write = self.write.lock().await;
            write.send(Message::Text(request)).await
        };
        if let Err(e) = sent {
            self.forget(id);
            return Err(TransportError::SendFailed(e.to_string()));
        }

        rx.await.map_err(|_| TransportError::Closed)
    }
}

impl Drop for DevToolsClient {
    fn drop(&mut self) {
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
    }
}
