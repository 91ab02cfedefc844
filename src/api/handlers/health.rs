//! Health and status endpoint handlers.

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use std::sync::Arc;

use crate::api::response;
use crate::api::state::AppState;

/// GET /api/v1/health
pub async fn get_health(_state: Arc<AppState>) -> Response<Full<Bytes>> {
    response::json_response(
        hyper::StatusCode::OK,
        &serde_json::json!({
            "status": "healthy",
            "service": "raftkv"
        }),
    )
}

/// GET /api/v1/status
///
/// Node-level status: identity, role, uptime.
pub async fn get_status(state: Arc<AppState>) -> Response<Full<Bytes>> {
    response::json_response(
        hyper::StatusCode::OK,
        &serde_json::json!({
            "status": "running",
            "service": "raftkv",
            "node_id": state.node_id,
            "role": state.engine.role().as_str(),
            "uptime_seconds": state.uptime_secs(),
        }),
    )
}
