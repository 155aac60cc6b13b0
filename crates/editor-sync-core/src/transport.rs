//! ScriptEvaluator trait for the remote debugging transport.
//!
//! Implementations:
//! - `DevToolsClient` (in editor-sync) - Runtime.evaluate over a DevTools WebSocket
//! - `InMemoryPage` - For testing

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("No debuggable page target: {0}")]
    TargetNotFound(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Connection closed")]
    Closed,

    #[error("Transport error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Runs a script in the remote page and returns the raw JSON-shaped response.
///
/// The response text is expected to wrap the script's value as
/// `{"result":{"result":{"value": ...}}}`; callers interpret it.
#[async_trait]
pub trait ScriptEvaluator: Send + Sync {
    async fn evaluate(&self, script: &str) -> Result<String>;
}

// Lets tests keep a handle on the evaluator they hand to an adapter.
#[async_trait]
impl<T: ScriptEvaluator + ?Sized> ScriptEvaluator for Arc<T> {
    async fn evaluate(&self, script: &str) -> Result<String> {
        (**self).evaluate(script).await
    }
}
