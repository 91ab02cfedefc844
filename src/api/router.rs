//! Request routing for the API.
//!
//! Routes requests to appropriate handlers based on method and path.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

use super::handlers;
use super::response;
use super::state::AppState;

/// Route prefix for all API endpoints.
const API_PREFIX: &str = "/api/v1";

/// Route an incoming request to the appropriate handler.
pub async fn route(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    tracing::debug!(method = %method, path = %path, "routing request");

    let path = path.strip_prefix(API_PREFIX).unwrap_or(&path);

    let response = match (method, path) {
        (Method::GET, "/health") => handlers::health::get_health(state).await,
        (Method::GET, "/status") => handlers::health::get_status(state).await,

        (Method::POST, "/store") => handlers::store::set(req, state).await,
        (_, p) if p.starts_with("/store/") => route_store_key(req, state, p).await,

        (Method::POST, "/raft/join") => handlers::cluster::join(req, state).await,
        (Method::POST, "/raft/remove") => handlers::cluster::remove(req, state).await,
        (Method::GET, "/raft/stats") => handlers::cluster::stats(state).await,

        _ => response::not_found(),
    };

    Ok(response)
}

/// Route requests under /store/{key}.
async fn route_store_key(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<Full<Bytes>> {
    // An empty key falls through to the handlers, which answer 422.
    let key = path.strip_prefix("/store/").unwrap_or("");

    match *req.method() {
        Method::GET => handlers::store::get(state, key).await,
        Method::DELETE => handlers::store::delete(state, key).await,
        _ => response::method_not_allowed(&["GET", "DELETE"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_prefix_defined() {
        assert_eq!(API_PREFIX, "/api/v1");
    }
}
