//! DevTools protocol messages.
//!
//! Only the pieces the client needs: the `/json` target listing, the
//! `Runtime.evaluate` request, and the `id` that routes a response back to
//! its caller.

use serde::Deserialize;
use serde_json::json;

/// Maximum message size (50MB) accepted from the browser.
pub const MAX_MESSAGE_SIZE: usize = 50 * 1024 * 1024;

/// One entry of the `/json` target listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInfo {
    pub id: String,

    /// "page", "background_page", "service_worker", ...
    #[serde(rename = "type")]
    pub target_type: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,

    /// Absent while another client is attached to the target
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: Option<String>,
}

/// The `tab`-th target of type "page", in listing order.
pub fn select_page(targets: &[TargetInfo], tab: usize) -> Option<&TargetInfo> {
    targets
        .iter()
        .filter(|t| t.target_type == "page")
        .nth(tab)
}

/// `Runtime.evaluate` request text for `expression`.
pub fn evaluate_request(id: u64, expression: &str) -> String {
    json!({
        "id": id,
        "method": "Runtime.evaluate",
        "params": { "expression": expression },
    })
    .to_string()
}

#[derive(Deserialize)]
struct Envelope {
    id: Option<u64>,
}

/// The `id` of a response, or None for events and unparseable text.
pub fn response_id(text: &str) -> Option<u64> {
    serde_json::from_str::<Envelope>(text).ok()?.id
}
