//! JSON response builders for the API.
//!
//! Success bodies are `{"message": ..., "data": ...}`; failures are
//! `{"error": ...}`. Clients key off these envelopes, so handlers never
//! build bodies by hand.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Build a JSON response with status code.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body).unwrap_or_else(|e| {
        serde_json::json!({
            "error": format!("serialization error: {e}")
        })
        .to_string()
    });

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .expect("response builder should not fail")
}

/// Build a 200 OK response with the message/data envelope.
pub fn ok<T: Serialize>(message: &str, data: &T) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "message": message,
            "data": data,
        }),
    )
}

/// Build an error response with the error envelope.
pub fn error(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// Build a 404 Not Found response for an unmatched route.
pub fn not_found() -> Response<Full<Bytes>> {
    error(StatusCode::NOT_FOUND, "not found")
}

/// Build a 405 Method Not Allowed response.
pub fn method_not_allowed(allowed: &[&str]) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": format!("method not allowed. Allowed: {}", allowed.join(", "))
    });

    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .header("Allow", allowed.join(", "))
        .body(Full::new(Bytes::from(body.to_string())))
        .expect("response builder should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_wraps_message_and_data() {
        let response = ok("success", &serde_json::json!({"key": "a"}));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn error_uses_flat_envelope() {
        let response = error(StatusCode::SERVICE_UNAVAILABLE, "not the leader");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn method_not_allowed_sets_allow_header() {
        let response = method_not_allowed(&["GET", "DELETE"]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get("Allow").unwrap(), "GET, DELETE");
    }
}
