// Integration tests: HTTP and agent WebSocket endpoints

mod common;

use axum_test::TestServer;
use common::{temp_repo, test_app_config};
use pc_monitor::computer_repo::ComputerRepo;
use pc_monitor::models::{PresenceStatus, StatusResponse};
use pc_monitor::notifier::TelegramNotifier;
use pc_monitor::registry::ConnectionRegistry;
use pc_monitor::routes;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::time::{Duration, Instant};

struct TestApp {
    _dir: TempDir,
    server: TestServer,
    registry: Arc<ConnectionRegistry>,
    repo: Arc<ComputerRepo>,
}

async fn test_app() -> TestApp {
    let (dir, repo) = temp_repo().await;
    let repo = Arc::new(repo);
    let registry = Arc::new(ConnectionRegistry::new());
    let app = routes::app(
        registry.clone(),
        repo.clone(),
        TelegramNotifier::disabled(),
        test_app_config(),
    );
    // http_transport is required for WebSocket tests.
    let server = TestServer::builder().http_transport().build(app);
    TestApp {
        _dir: dir,
        server,
        registry,
        repo,
    }
}

async fn status(server: &TestServer) -> StatusResponse {
    let response = server.get("/api/status").await;
    response.assert_status_ok();
    response.json()
}

/// Polls /api/status until `pred` holds (socket teardown runs after the client closes).
async fn wait_for_status(server: &TestServer, pred: impl Fn(&StatusResponse) -> bool) -> StatusResponse {
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        let s = status(server).await;
        if pred(&s) {
            return s;
        }
        assert!(Instant::now() < deadline, "timed out waiting for status: {s:?}");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = test_app().await;
    let response = app.server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("pc-monitor")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_status_empty() {
    let app = test_app().await;
    let s = status(&app.server).await;
    assert!(s.computers.is_empty());
    assert_eq!((s.stats.total, s.stats.online, s.stats.offline), (0, 0, 0));
}

#[tokio::test]
async fn test_status_online_comes_from_live_connections() {
    let app = test_app().await;
    // Stored as online, but no live connection (e.g. after a restart).
    app.repo
        .update_status("stale", PresenceStatus::Online)
        .await
        .unwrap();
    app.repo
        .update_status("live", PresenceStatus::Offline)
        .await
        .unwrap();
    let _lease = app.registry.register("live").await;

    let s = status(&app.server).await;
    assert_eq!((s.stats.total, s.stats.online, s.stats.offline), (2, 1, 1));
    // Most recently seen first.
    assert_eq!(s.computers[0].name, "live");
    assert!(s.computers[0].is_online);
    assert_eq!(s.computers[1].name, "stale");
    assert!(!s.computers[1].is_online);
}

#[tokio::test]
async fn test_dashboard_page_is_prerendered() {
    let app = test_app().await;
    app.repo
        .update_status("<b>PC1</b>", PresenceStatus::Offline)
        .await
        .unwrap();
    let response = app.server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("id=\"device-list\""));
    assert!(html.contains("id=\"total-devices\">1<"));
    assert!(html.contains("&lt;b&gt;PC1&lt;/b&gt;"));
    assert!(html.contains("OFFLINE"));
}

#[tokio::test]
async fn test_agent_handshake_ping_and_disconnect() {
    let app = test_app().await;
    let mut ws = app.server.get_websocket("/ws").await.into_websocket().await;
    ws.send_text("online:PC1").await;

    let s = wait_for_status(&app.server, |s| s.stats.online == 1).await;
    assert_eq!(s.computers[0].name, "PC1");
    assert_eq!(s.computers[0].status.as_deref(), Some("online"));

    ws.send_text("ping").await;
    ws.assert_receive_text("pong").await;

    ws.close().await;
    let s = wait_for_status(&app.server, |s| s.stats.online == 0).await;
    assert_eq!(s.stats.total, 1);
    assert_eq!(s.computers[0].status.as_deref(), Some("offline"));
    assert!(!app.registry.is_online("PC1").await);
}

#[tokio::test]
async fn test_agent_reconnect_keeps_new_connection_online() {
    let app = test_app().await;
    let mut first = app.server.get_websocket("/ws").await.into_websocket().await;
    first.send_text("online:PC1").await;
    wait_for_status(&app.server, |s| s.stats.online == 1).await;

    let mut second = app.server.get_websocket("/ws").await.into_websocket().await;
    second.send_text("online:PC1").await;
    second.send_text("ping").await;
    second.assert_receive_text("pong").await;

    // The replaced socket is closed by the server; its teardown must not mark PC1 offline.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let s = status(&app.server).await;
    assert_eq!(s.stats.online, 1);
    assert_eq!(s.computers[0].status.as_deref(), Some("online"));
    drop(first);
}

#[tokio::test]
async fn test_invalid_handshake_registers_nothing() {
    let app = test_app().await;
    let mut ws = app.server.get_websocket("/ws").await.into_websocket().await;
    ws.send_text("hello").await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.registry.is_empty().await);
    let s = status(&app.server).await;
    assert_eq!(s.stats.total, 0);
}
