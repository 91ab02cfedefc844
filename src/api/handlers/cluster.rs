//! Cluster membership handlers.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::request;
use crate::api::response;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
struct JoinRequest {
    node_id: String,
    raft_address: String,
}

#[derive(Debug, Deserialize)]
struct RemoveRequest {
    node_id: String,
}

/// POST /api/v1/raft/join
///
/// Adds a voting member. Leader-only; membership itself replicates through
/// the engine's configuration log.
pub async fn join(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let form: JoinRequest = match request::bind_json(req).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    match state.membership.join(&form.node_id, &form.raft_address).await {
        Ok(stats) => response::ok(
            &format!(
                "node {} at {} joined successfully",
                form.node_id, form.raft_address
            ),
            &stats,
        ),
        Err(e) => ApiError::service_unavailable(e.to_string()).into_response(),
    }
}

/// POST /api/v1/raft/remove
pub async fn remove(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let form: RemoveRequest = match request::bind_json(req).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    match state.membership.remove(&form.node_id).await {
        Ok(stats) => response::ok(
            &format!("node {} removed successfully", form.node_id),
            &stats,
        ),
        Err(e) => ApiError::service_unavailable(e.to_string()).into_response(),
    }
}

/// GET /api/v1/raft/stats
///
/// Always available, whatever the role.
pub async fn stats(state: Arc<AppState>) -> Response<Full<Bytes>> {
    response::ok("Here is the raft status", &state.membership.stats())
}
