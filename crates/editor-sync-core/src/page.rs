//! In-memory stand-in for a browser page holding editor widgets.
//!
//! Understands the scripts generated by `RemoteEditor` and answers with
//! Runtime.evaluate-shaped JSON, so the whole engine can run without a
//! browser.

use crate::escape::unescape_script_literal;
use crate::transport::{Result, ScriptEvaluator};
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Mutex, MutexGuard};

type Normalizer = Box<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Default)]
struct PageState {
    editors: Vec<String>,
    scripts: Vec<String>,
    set_calls: Vec<(usize, String)>,
    next_id: u64,
}

/// In-memory page for testing
pub struct InMemoryPage {
    state: Mutex<PageState>,
    /// Applied to every value set through a script, like an editor that
    /// rewrites line endings or trims trailing whitespace
    normalizer: Option<Normalizer>,
}

impl InMemoryPage {
    /// Create a page with `editors` empty editor widgets.
    pub fn new(editors: usize) -> Self {
        Self {
            state: Mutex::new(PageState {
                editors: vec![String::new(); editors],
                ..PageState::default()
            }),
            normalizer: None,
        }
    }

    /// Rewrite every pushed value with `normalizer` before storing it.
    pub fn with_normalizer(
        mut self,
        normalizer: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.normalizer = Some(Box::new(normalizer));
        self
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Simulate the user typing into the editor at `index`.
    pub fn edit(&self, index: usize, text: &str) {
        if let Some(slot) = self.lock().editors.get_mut(index) {
            *slot = text.to_string();
        }
    }

    /// Current text of the editor at `index`.
    pub fn value(&self, index: usize) -> Option<String> {
        self.lock().editors.get(index).cloned()
    }

    /// Every script evaluated so far, in order.
    pub fn scripts(&self) -> Vec<String> {
        self.lock().scripts.clone()
    }

    /// Every decoded `setValue` call, in order.
    pub fn set_calls(&self) -> Vec<(usize, String)> {
        self.lock().set_calls.clone()
    }

    fn run(&self, script: &str) -> serde_json::Value {
        let mut state = self.lock();
        state.scripts.push(script.to_string());
        state.next_id += 1;
        let id = state.next_id;

        let Some(index) = bound_index(script) else {
            return json!({"id": id, "result": {"result": {"type": "undefined"}}});
        };

        if index >= state.editors.len() {
            return json!({
                "id": id,
                "result": {
                    "result": {
                        "type": "object",
                        "subtype": "error",
                        "className": "TypeError",
                        "description": "TypeError: Cannot read properties of undefined (reading 'CodeMirror')"
                    },
                    "exceptionDetails": {"exceptionId": 1, "text": "Uncaught"}
                }
            });
        }

        if let Some(literal) = set_value_literal(script) {
            let text = unescape_script_literal(literal);
            let stored = match &self.normalizer {
                Some(normalize) => normalize(&text),
                None => text.clone(),
            };
            state.set_calls.push((index, text));
            state.editors[index] = stored;
            return json!({"id": id, "result": {"result": {"type": "undefined"}}});
        }

        if script.ends_with(".getValue()") {
            let value = state.editors[index].clone();
            return json!({"id": id, "result": {"result": {"type": "string", "value": value}}});
        }

        json!({"id": id, "result": {"result": {"type": "undefined"}}})
    }
}

/// Index `N` from a script starting with `var tmpeditorN = ...`.
fn bound_index(script: &str) -> Option<usize> {
    let rest = script.strip_prefix("var tmpeditor")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Body of the `.setValue('...')` literal, still escaped.
fn set_value_literal(script: &str) -> Option<&str> {
    let start = script.find(".setValue('")? + ".setValue('".len();
    script.strip_suffix("')").filter(|s| s.len() >= start).map(|s| &s[start..])
}

#[async_trait]
impl ScriptEvaluator for InMemoryPage {
    async fn evaluate(&self, script: &str) -> Result<String> {
        Ok(self.run(script).to_string())
    }
}
