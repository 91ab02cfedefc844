//! Request body helpers.

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use hyper::Request;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// Largest request body the API accepts.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Collect the request body, bounded by [`MAX_BODY_BYTES`].
pub async fn read_body(req: Request<Incoming>) -> Result<Bytes, ApiError> {
    let limited = Limited::new(req.into_body(), MAX_BODY_BYTES);

    match limited.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) => Err(ApiError::unprocessable(format!("error reading body: {e}"))),
    }
}

/// Collect and deserialize a JSON request body.
pub async fn bind_json<T: DeserializeOwned>(req: Request<Incoming>) -> Result<T, ApiError> {
    let bytes = read_body(req).await?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::unprocessable(format!("error binding: {e}")))
}
