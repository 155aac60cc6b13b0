//! End-to-end tests for editor-sync.
//!
//! Tests the native adapters: the DevTools client against a local WebSocket
//! server, the folder watcher on a real directory, the one-shot commands,
//! and a full sync session driving an in-memory page.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use editor_sync::commands::{self, FileArg};
use editor_sync::devtools::DevToolsClient;
use editor_sync::session::Session;
use editor_sync::watcher::FolderWatcher;
use editor_sync_core::editor::response_value;
use editor_sync_core::{
    event_queue, Bindings, InMemoryPage, Origin, QueueOrder, RemoteEditor, ScriptEvaluator,
    SyncConfig, TransportError,
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

// ============================================================================
// Helpers
// ============================================================================

/// Local stand-in for a tab's DevTools endpoint.
///
/// Answers every Runtime.evaluate with `"echo:<expression>"`, preceded by an
/// unrelated protocol event. The expression `close` closes the socket.
async fn spawn_fake_devtools() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("Failed to accept");
        let mut ws = accept_async(stream).await.expect("WebSocket upgrade failed");

        while let Some(Ok(msg)) = ws.next().await {
            let Message::Text(text) = msg else {
                continue;
            };
            let request: Value = serde_json::from_str(&text).expect("Request is not JSON");
            let expression = request["params"]["expression"]
                .as_str()
                .unwrap_or_default()
                .to_string();

            if expression == "close" {
                let _ = ws.close(None).await;
                break;
            }

            let event = json!({"method": "Runtime.consoleAPICalled", "params": {}});
            ws.send(Message::Text(event.to_string())).await.unwrap();

            let response = json!({
                "id": request["id"],
                "result": {"result": {"type": "string", "value": format!("echo:{}", expression)}}
            });
            ws.send(Message::Text(response.to_string())).await.unwrap();
        }
    });

    (format!("ws://{}", addr), handle)
}

/// Poll `check` until it holds or `limit` elapses.
async fn eventually(limit: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    check()
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

// ============================================================================
// DevTools client
// ============================================================================

#[tokio::test]
async fn test_devtools_evaluate_routes_response_by_id() {
    let (url, _server) = spawn_fake_devtools().await;
    let client = DevToolsClient::connect(&url).await.expect("Failed to connect");

    let first = client.evaluate("1 + 1").await.unwrap();
    let second = client.evaluate("document.title").await.unwrap();

    assert_eq!(response_value(&first), "echo:1 + 1");
    assert_eq!(response_value(&second), "echo:document.title");
    assert_eq!(client.url(), url);
}

#[tokio::test]
async fn test_devtools_client_behind_editor_adapter() {
    let (url, _server) = spawn_fake_devtools().await;
    let client = DevToolsClient::connect(&url).await.expect("Failed to connect");
    let editor = RemoteEditor::new(client);

    let value = editor.get_value(3).await.unwrap();
    assert!(value.starts_with("echo:var tmpeditor3 = document.querySelectorAll('.CodeMirror')[3]"));
    assert!(value.ends_with("tmpeditor3.getValue()"));
}

#[tokio::test]
async fn test_devtools_closed_connection_fails_calls() {
    let (url, server) = spawn_fake_devtools().await;
    let client = DevToolsClient::connect(&url).await.expect("Failed to connect");

    let result = timeout(Duration::from_secs(5), client.evaluate("close"))
        .await
        .expect("Timeout waiting for close");
    assert!(matches!(result, Err(TransportError::Closed)));

    server.await.unwrap();
    let again = client.evaluate("1").await;
    assert!(matches!(again, Err(TransportError::Closed)));
}

#[tokio::test]
async fn test_devtools_connect_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = DevToolsClient::connect(&format!("ws://{}", addr)).await;
    assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
}

// ============================================================================
// Folder watcher
// ============================================================================

#[tokio::test]
async fn test_folder_watcher_reports_tracked_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = temp_dir.path().join("a.js");
    let b = temp_dir.path().join("b.js");
    std::fs::write(&a, "").unwrap();
    std::fs::write(&b, "").unwrap();

    let bindings = Arc::new(Bindings::new([&a, &b]).unwrap());
    let (tx, mut rx) = event_queue(QueueOrder::Fifo);
    let _watcher = FolderWatcher::new(temp_dir.path(), bindings, tx, Duration::from_millis(50))
        .expect("Failed to create watcher");

    // Give watcher time to fully initialize
    tokio::time::sleep(Duration::from_millis(500)).await;

    // Untracked file first (should be ignored)
    std::fs::write(temp_dir.path().join("c.js"), "ignored").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(&b, "x = 1;").unwrap();

    // Modify again to ensure FSEvents triggers
    tokio::time::sleep(Duration::from_millis(100)).await;
    std::fs::write(&b, "x = 2;").unwrap();

    let event = timeout(Duration::from_secs(10), rx.pop())
        .await
        .expect("Timeout waiting for file event")
        .expect("Queue closed");

    assert_eq!(event.origin(), Origin::LocalFile);
    assert_eq!(event.index(), 1, "Should report b.js, not c.js");
}

#[tokio::test]
async fn test_folder_watcher_ignores_untracked_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = temp_dir.path().join("a.js");
    std::fs::write(&a, "").unwrap();

    let bindings = Arc::new(Bindings::new([&a]).unwrap());
    let (tx, mut rx) = event_queue(QueueOrder::Fifo);
    let _watcher = FolderWatcher::new(temp_dir.path(), bindings, tx, Duration::from_millis(50))
        .expect("Failed to create watcher");

    tokio::time::sleep(Duration::from_millis(500)).await;
    std::fs::write(temp_dir.path().join("notes.txt"), "untracked").unwrap();

    assert!(
        timeout(Duration::from_millis(1500), rx.pop()).await.is_err(),
        "Untracked file must not produce events"
    );
}

// ============================================================================
// One-shot commands
// ============================================================================

#[tokio::test]
async fn test_push_and_pull_commands() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("in.js");
    let target = temp_dir.path().join("out.js");
    std::fs::write(&source, "const s = 'it\\'s';\nconsole.log(s);\n").unwrap();

    let page = Arc::new(InMemoryPage::new(2));
    let editor = RemoteEditor::new(Arc::clone(&page));

    commands::push(&editor, &FileArg::Path(source.clone()), 1)
        .await
        .unwrap();
    assert_eq!(page.value(1), Some(read(&source)));

    commands::pull(&editor, &FileArg::Path(target.clone()), 1)
        .await
        .unwrap();
    assert_eq!(read(&target), read(&source));
}

#[tokio::test]
async fn test_push_missing_file_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let editor = RemoteEditor::new(InMemoryPage::new(1));

    let result = commands::push(&editor, &FileArg::Path(temp_dir.path().join("nope.js")), 0).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_execjs_returns_raw_response() {
    let (url, _server) = spawn_fake_devtools().await;
    let editor = RemoteEditor::new(DevToolsClient::connect(&url).await.unwrap());

    let raw = commands::execjs(&editor, "navigator.userAgent").await.unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["result"]["result"]["value"], "echo:navigator.userAgent");
}

// ============================================================================
// Sync session
// ============================================================================

#[tokio::test]
async fn test_session_syncs_both_directions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = temp_dir.path().join("a.js");
    let b = temp_dir.path().join("b.js");
    std::fs::write(&a, "").unwrap();
    std::fs::write(&b, "").unwrap();

    let page = Arc::new(InMemoryPage::new(2));
    let editor = Arc::new(RemoteEditor::new(Arc::clone(&page)));
    let config = SyncConfig {
        poll_period: Duration::from_millis(100),
        debounce_window: Duration::from_millis(200),
        watch_coalesce: Duration::from_millis(20),
        ..SyncConfig::default()
    };

    let session = Session::start(
        editor,
        temp_dir.path(),
        Bindings::new([&a, &b]).unwrap(),
        &config,
    )
    .expect("Failed to start session");

    // Let the watcher settle before touching files
    tokio::time::sleep(Duration::from_millis(500)).await;

    // Disk -> editor
    std::fs::write(&a, "x = 1;").unwrap();
    assert!(
        eventually(Duration::from_secs(10), || page.value(0).as_deref() == Some("x = 1;")).await,
        "Edit to a.js should reach editor 0"
    );

    // Editor -> disk
    page.edit(1, "y = 2;");
    assert!(
        eventually(Duration::from_secs(10), || read(&b) == "y = 2;").await,
        "Edit to editor 1 should reach b.js"
    );

    // Nothing echoes back: a.js keeps what we wrote, editor 1 keeps its text
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(read(&a), "x = 1;");
    assert_eq!(page.value(1).as_deref(), Some("y = 2;"));
    assert_eq!(page.set_calls()[0], (0, "x = 1;".to_string()));

    session.stop();
}
