//! API error type and KvError → HTTP status mapping.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

use crate::error::KvError;

use super::response;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    /// Human-readable error message, rendered as `{"error": message}`.
    pub message: String,
    /// HTTP status code.
    pub status: StatusCode,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// 422 Unprocessable Entity.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 503 Service Unavailable.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Convert to an HTTP response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        response::error(self.status, &self.message)
    }
}

impl From<KvError> for ApiError {
    fn from(err: KvError) -> Self {
        let status = match &err {
            // Invalid request; retrying unchanged cannot succeed.
            KvError::EmptyKey => StatusCode::UNPROCESSABLE_ENTITY,
            // The client should rediscover the leader and retry there.
            KvError::NotLeader => StatusCode::SERVICE_UNAVAILABLE,
            KvError::KeyNotFound { .. } => StatusCode::NOT_FOUND,
            // Everything else is a node-side failure.
            _ => StatusCode::SERVICE_UNAVAILABLE,
        };

        Self {
            message: err.to_string(),
            status,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}
