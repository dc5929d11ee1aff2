// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum_test::TestServer;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use sysmon::cache::SnapshotCache;
use sysmon::models::{HostInfo, MetricSnapshot};
use sysmon::routes;
use tokio::sync::broadcast;

fn test_host_info() -> HostInfo {
    HostInfo {
        hostname: "testbox".into(),
        platform: "Linux".into(),
        ip_addresses: vec!["192.168.1.10".into()],
    }
}

fn test_app() -> (
    axum::Router,
    broadcast::Sender<MetricSnapshot>,
    Arc<SnapshotCache>,
) {
    let (tx, _) = broadcast::channel(16);
    let cache = Arc::new(SnapshotCache::new());
    let app = routes::app(
        tx.clone(),
        cache.clone(),
        Arc::new(test_host_info()),
        Arc::new(AtomicUsize::new(0)),
    );
    (app, tx, cache)
}

/// Build TestServer with http_transport (required for WebSocket tests).
fn test_server_with_http() -> (
    TestServer,
    broadcast::Sender<MetricSnapshot>,
    Arc<SnapshotCache>,
) {
    let (app, tx, cache) = test_app();
    let server = TestServer::builder().http_transport().build(app).unwrap();
    (server, tx, cache)
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("sysmon: system monitor server");
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("sysmon"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_api_info_returns_host_identity() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app).unwrap();
    let response = server.get("/api/info").await;
    response.assert_status_ok();
    let info: HostInfo = response.json();
    assert_eq!(info.hostname, "testbox");
    assert_eq!(info.ip_addresses, vec!["192.168.1.10".to_string()]);
}

#[tokio::test]
async fn test_api_stats_default_before_first_tick() {
    let (app, _, _) = test_app();
    let server = TestServer::new(app).unwrap();
    let response = server.get("/api/stats").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert!(json.get("cpu").unwrap().is_null());
    assert!(json.get("network").unwrap().is_null());
}

#[tokio::test]
async fn test_api_stats_returns_cached_snapshot() {
    let (app, _, cache) = test_app();
    let server = TestServer::new(app).unwrap();
    cache.store(common::minimal_snapshot(42_000));

    let response = server.get("/api/stats").await;
    response.assert_status_ok();
    let snapshot: MetricSnapshot = response.json();
    assert_eq!(snapshot, common::minimal_snapshot(42_000));
}

// --- WebSocket message tests (require http_transport + ws feature) ---
// Receive until the payload parses as a snapshot (server sends a welcome
// frame first and may interleave Pings).

async fn receive_first_snapshot(ws: &mut axum_test::TestWebSocket) -> MetricSnapshot {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<MetricSnapshot>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for snapshot JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_stats_sends_welcome_first() {
    let (server, _tx, _) = test_server_with_http();
    let mut ws = server
        .get_websocket("/ws/stats")
        .await
        .into_websocket()
        .await;
    let text = ws.receive_text().await;
    let welcome: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(welcome.get("type").and_then(|v| v.as_str()), Some("info"));
    assert_eq!(
        welcome
            .pointer("/host/hostname")
            .and_then(|v| v.as_str()),
        Some("testbox")
    );
}

#[tokio::test]
async fn test_ws_stats_receives_broadcast_snapshot() {
    let (server, tx, _) = test_server_with_http();
    let mut ws = server
        .get_websocket("/ws/stats")
        .await
        .into_websocket()
        .await;

    // Skip the welcome frame, then broadcast one tick
    let _ = ws.receive_text().await;
    tx.send(common::minimal_snapshot(1_000)).unwrap();

    let snapshot = receive_first_snapshot(&mut ws).await;
    assert_eq!(snapshot, common::minimal_snapshot(1_000));
}

#[tokio::test]
async fn test_ws_stats_delivers_in_tick_order() {
    let (server, tx, _) = test_server_with_http();
    let mut ws = server
        .get_websocket("/ws/stats")
        .await
        .into_websocket()
        .await;
    let _ = ws.receive_text().await;

    tx.send(common::minimal_snapshot(1_000)).unwrap();
    tx.send(common::minimal_snapshot(2_000)).unwrap();

    let first = receive_first_snapshot(&mut ws).await;
    let second = receive_first_snapshot(&mut ws).await;
    assert!(second.timestamp > first.timestamp);
}

#[tokio::test]
async fn test_ws_stats_sends_cached_snapshot_on_connect() {
    let (server, _tx, cache) = test_server_with_http();
    cache.store(common::minimal_snapshot(7_000));

    let mut ws = server
        .get_websocket("/ws/stats")
        .await
        .into_websocket()
        .await;
    let _ = ws.receive_text().await; // welcome

    // No broadcast happened; the cached snapshot arrives anyway
    let snapshot = receive_first_snapshot(&mut ws).await;
    assert_eq!(snapshot, common::minimal_snapshot(7_000));
}

#[tokio::test]
async fn test_ws_stats_never_duplicates_cached_tick() {
    let (server, tx, cache) = test_server_with_http();
    // The worker stores a tick in the cache before broadcasting it; a client
    // connecting in between sees it cached AND still in flight.
    cache.store(common::minimal_snapshot(1_000));

    let mut ws = server
        .get_websocket("/ws/stats")
        .await
        .into_websocket()
        .await;
    let _ = ws.receive_text().await; // welcome

    let first = receive_first_snapshot(&mut ws).await;
    assert_eq!(first, common::minimal_snapshot(1_000));

    tx.send(common::minimal_snapshot(1_000)).unwrap();
    tx.send(common::minimal_snapshot(2_000)).unwrap();

    // The in-flight copy of tick 1000 is suppressed; next delivery is 2000
    let second = receive_first_snapshot(&mut ws).await;
    assert!(
        second.timestamp > first.timestamp,
        "cached tick delivered twice"
    );
    assert_eq!(second, common::minimal_snapshot(2_000));
}

#[tokio::test]
async fn test_ws_disconnect_leaves_other_subscribers_working() {
    let (server, tx, _) = test_server_with_http();
    let mut ws_keep = server
        .get_websocket("/ws/stats")
        .await
        .into_websocket()
        .await;
    let ws_drop = server
        .get_websocket("/ws/stats")
        .await
        .into_websocket()
        .await;
    let _ = ws_keep.receive_text().await;

    tx.send(common::minimal_snapshot(1_000)).unwrap();
    let first = receive_first_snapshot(&mut ws_keep).await;

    drop(ws_drop);
    tx.send(common::minimal_snapshot(2_000)).unwrap();
    let second = receive_first_snapshot(&mut ws_keep).await;

    assert!(second.timestamp > first.timestamp);
}
