// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::cache::SnapshotCache;
use crate::models::{HostInfo, MetricSnapshot};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) stats_tx: broadcast::Sender<MetricSnapshot>,
    pub(crate) cache: Arc<SnapshotCache>,
    pub(crate) host_info: Arc<HostInfo>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
}

pub fn app(
    stats_tx: broadcast::Sender<MetricSnapshot>,
    cache: Arc<SnapshotCache>,
    host_info: Arc<HostInfo>,
    ws_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        stats_tx,
        cache,
        host_info,
        ws_connections,
    };
    Router::new()
        .route("/", get(|| async { "sysmon: system monitor server" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/info", get(http::api_info_handler)) // GET /api/info
        .route("/api/stats", get(http::api_stats_handler)) // GET /api/stats
        .route("/ws/stats", get(ws::ws_stats)) // WS /ws/stats
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
