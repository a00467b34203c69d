//! Response construction.
//!
//! Two shapes leave the relay: an upstream JSON body relayed byte-for-byte,
//! or a locally built `{"error": "..."}` body.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::IgnoredAny;
use serde::Serialize;

/// JSON error body returned for every failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

/// Build a `{"error": message}` response with the given status.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

/// Relay an upstream JSON body unchanged with status 200.
///
/// The body is checked to be well-formed JSON but never re-serialized, so key
/// order and whitespace survive.
pub fn passthrough_json(body: Bytes) -> Result<Response, serde_json::Error> {
    serde_json::from_slice::<IgnoredAny>(&body)?;

    let mut response = Response::new(Body::from(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(response)
}
