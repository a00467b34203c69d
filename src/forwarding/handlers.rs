//! Axum handlers for the two relayed operations.

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::forwarding::client::{TokenRequest, UpstreamResponse};
use crate::forwarding::error::{RelayError, DETAILS_FAILED, INVALID_CREDENTIALS};
use crate::http::request::authorization;
use crate::http::response::passthrough_json;
use crate::http::server::RelayState;

/// `POST /token/`: exchange credentials for an upstream access token.
pub async fn issue_token(
    State(state): State<RelayState>,
    body: Bytes,
) -> Result<Response, RelayError> {
    let request: TokenRequest = if body.iter().all(u8::is_ascii_whitespace) {
        TokenRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(RelayError::MalformedBody)?
    };
    let credentials = request
        .into_credentials()
        .ok_or(RelayError::MissingCredentials)?;

    tracing::debug!("Forwarding token request");

    let upstream = state.upstream.request_token(&credentials).await?;
    relay(upstream, INVALID_CREDENTIALS)
}

/// `GET /student-details/{student_id}/`: fetch one student's profile with the
/// caller's token.
pub async fn fetch_student_details(
    State(state): State<RelayState>,
    student_id: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, RelayError> {
    let Path(student_id) = student_id.map_err(RelayError::InvalidStudentId)?;
    let token = authorization(&headers).ok_or(RelayError::MissingAccessToken)?;

    tracing::debug!(student_id = %student_id, "Forwarding student details request");

    let upstream = state.upstream.student_details(&student_id, token).await?;
    relay(upstream, DETAILS_FAILED)
}

/// Map an upstream reply onto the inbound response: 200 passes through,
/// anything else keeps its status with a fixed message.
fn relay(upstream: UpstreamResponse, failure: &'static str) -> Result<Response, RelayError> {
    if upstream.status != StatusCode::OK {
        tracing::warn!(status = %upstream.status, "Upstream rejected request");
        return Err(RelayError::Upstream {
            status: upstream.status,
            message: failure,
        });
    }

    passthrough_json(upstream.body).map_err(RelayError::InvalidUpstreamBody)
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /health`: liveness only; upstream is not probed.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "operational",
        version: env!("CARGO_PKG_VERSION"),
    })
}
