// GET handlers: version, api/info, api/stats

use axum::{extract::State, response::IntoResponse};

use super::AppState;
use crate::models::MetricSnapshot;
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/info — returns static host identity (fetched once at startup).
pub(super) async fn api_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.host_info.as_ref().clone())
}

/// GET /api/stats — returns the latest cached snapshot without triggering a
/// collection; a default-valued record (null families) before the first tick.
pub(super) async fn api_stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.cache.latest().unwrap_or_else(MetricSnapshot::default))
}
