//! Remote editor adapter.
//!
//! Wraps the two page operations used everywhere, "set editor value" and
//! "get editor value", plus raw script execution. All three go through one
//! gate because the remote session handles a single in-flight call at a time.

use crate::escape::escape_script_literal;
use crate::transport::{Result, ScriptEvaluator};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

/// CSS selector matching CodeMirror editor widgets.
pub const DEFAULT_SELECTOR: &str = ".CodeMirror";

/// `{"result":{"result":{"value": ...}}}` as returned by Runtime.evaluate.
#[derive(Debug, Deserialize)]
struct EvaluateResponse {
    result: Option<EvaluateResult>,
}

#[derive(Debug, Deserialize)]
struct EvaluateResult {
    result: Option<RemoteObject>,
}

#[derive(Debug, Deserialize)]
struct RemoteObject {
    value: Option<Value>,
}

/// Extract the string value from an evaluate response.
///
/// Anything else (no editor at that index, a thrown exception, a non-string
/// value, malformed JSON) yields an empty string.
pub fn response_value(response: &str) -> String {
    serde_json::from_str::<EvaluateResponse>(response)
        .ok()
        .and_then(|r| r.result)
        .and_then(|r| r.result)
        .and_then(|o| o.value)
        .and_then(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .unwrap_or_default()
}

/// Adapter issuing editor calls through a `ScriptEvaluator`.
pub struct RemoteEditor<E> {
    evaluator: E,
    /// Escaped selector, ready for embedding
    selector: String,
    gate: Mutex<()>,
}

impl<E: ScriptEvaluator> RemoteEditor<E> {
    /// Create an adapter targeting CodeMirror widgets.
    pub fn new(evaluator: E) -> Self {
        Self::with_selector(evaluator, DEFAULT_SELECTOR)
    }

    /// Create an adapter targeting widgets matched by `selector`.
    ///
    /// Each matched element must carry the editor instance in its
    /// `CodeMirror` property.
    pub fn with_selector(evaluator: E, selector: &str) -> Self {
        Self {
            evaluator,
            selector: escape_script_literal(selector),
            gate: Mutex::new(()),
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Bind the editor at `index` (in document order) to `tmpeditor{index}`.
    fn bind_script(&self, index: usize) -> String {
        format!(
            "var tmpeditor{index} = document.querySelectorAll('{}')[{index}].CodeMirror;",
            self.selector
        )
    }

    /// Replace the text of the editor at `index`.
    pub async fn set_value(&self, index: usize, text: &str) -> Result<()> {
        debug!("Pushing code, idx = {} | {}", index, text);
        let escaped = escape_script_literal(text);

        let _guard = self.gate.lock().await;
        let script = format!(
            "{} tmpeditor{index}.setValue('{escaped}')",
            self.bind_script(index)
        );
        let response = self.evaluator.evaluate(&script).await?;
        debug!("Return value of push: {}", response);
        Ok(())
    }

    /// Read the text of the editor at `index`.
    ///
    /// Returns an empty string when the page has no usable value for it.
    pub async fn get_value(&self, index: usize) -> Result<String> {
        let _guard = self.gate.lock().await;
        let script = format!("{} tmpeditor{index}.getValue()", self.bind_script(index));
        let response = self.evaluator.evaluate(&script).await?;
        let value = response_value(&response);
        debug!("Pulled code, idx = {}, {} bytes", index, value.len());
        Ok(value)
    }

    /// Run an arbitrary script and return the raw response.
    pub async fn execute(&self, script: &str) -> Result<String> {
        let _guard = self.gate.lock().await;
        self.evaluator.evaluate(script).await
    }
}
