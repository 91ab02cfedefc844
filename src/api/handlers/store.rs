//! Key-value store handlers.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::request;
use crate::api::response;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
struct StoreRequest {
    key: String,
    #[serde(default)]
    value: Option<Value>,
}

/// POST /api/v1/store
///
/// Replicates a SET through the cluster. Leader-only; followers answer 503
/// and the client retries against the leader.
pub async fn set(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let form: StoreRequest = match request::bind_json(req).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    let key = form.key.trim().to_string();

    // Serialize up front so the codec carries the value opaquely.
    let blob = match &form.value {
        None => None,
        Some(value) => match serde_json::to_vec(value) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                return ApiError::unprocessable(format!("error serializing value: {e}"))
                    .into_response()
            }
        },
    };

    match state.writer.set(&key, blob).await {
        Ok(_) => response::ok(
            "success persisting data",
            &serde_json::json!({ "key": key, "value": form.value }),
        ),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /api/v1/store/{key}
///
/// Local read, no consensus round-trip: only as fresh as this node's
/// last-applied index.
pub async fn get(state: Arc<AppState>, key: &str) -> Response<Full<Bytes>> {
    match state.reader.get(key) {
        Ok(value) => response::ok(
            "success fetching data",
            &serde_json::json!({ "key": key.trim(), "value": value }),
        ),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// DELETE /api/v1/store/{key}
///
/// Replicates a DELETE through the cluster. Every failure on this endpoint
/// answers 422, not-leader included; clients treat the body's error text as
/// authoritative.
pub async fn delete(state: Arc<AppState>, key: &str) -> Response<Full<Bytes>> {
    match state.writer.delete(key).await {
        Ok(_) => response::ok(
            "success removing data",
            &serde_json::json!({ "key": key.trim(), "value": Value::Null }),
        ),
        Err(e) => ApiError::unprocessable(e.to_string()).into_response(),
    }
}
