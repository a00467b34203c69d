//! Error taxonomy for the forwarding handlers.

use axum::extract::rejection::PathRejection;
use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::error_response;

pub const MISSING_CREDENTIALS: &str = "Email and password are required";
pub const MALFORMED_BODY: &str = "Malformed JSON body";
pub const INVALID_STUDENT_ID: &str = "Invalid student id";
pub const MISSING_ACCESS_TOKEN: &str = "Missing access token";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const DETAILS_FAILED: &str = "Failed to fetch student details";
pub const UPSTREAM_FAILED: &str = "Upstream request failed";
pub const UPSTREAM_TIMED_OUT: &str = "Upstream request timed out";
pub const INVALID_UPSTREAM_BODY: &str = "Invalid upstream response";
pub const INTERNAL_ERROR: &str = "Internal error";

/// Errors a forwarding handler can end with. Every variant renders as a
/// `{"error": "..."}` JSON body.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Email or password missing or empty. No upstream call was made.
    #[error("Email and password are required")]
    MissingCredentials,

    /// Token request body was not a JSON object.
    #[error("Malformed JSON body: {0}")]
    MalformedBody(#[source] serde_json::Error),

    /// Student id path segment could not be decoded.
    #[error("Invalid student id: {0}")]
    InvalidStudentId(#[source] PathRejection),

    /// `Authorization` header missing or empty. No upstream call was made.
    #[error("Missing access token")]
    MissingAccessToken,

    /// Upstream answered with something other than 200. The upstream body
    /// is dropped; only its status survives.
    #[error("upstream returned {status}: {message}")]
    Upstream {
        status: StatusCode,
        message: &'static str,
    },

    /// Upstream answered 200 with a body that is not JSON.
    #[error("Invalid upstream response: {0}")]
    InvalidUpstreamBody(#[source] serde_json::Error),

    /// Upstream did not answer within the configured deadline.
    #[error("Upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection, TLS or protocol failure talking to upstream.
    #[error("Upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The student details URL could not be rendered.
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout(err)
        } else {
            RelayError::Transport(err)
        }
    }
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingCredentials
            | RelayError::MalformedBody(_)
            | RelayError::InvalidStudentId(_) => StatusCode::BAD_REQUEST,
            RelayError::MissingAccessToken => StatusCode::UNAUTHORIZED,
            RelayError::Upstream { status, .. } => *status,
            RelayError::InvalidUpstreamBody(_) | RelayError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
            RelayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Never includes upstream detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::MissingCredentials => MISSING_CREDENTIALS,
            RelayError::MalformedBody(_) => MALFORMED_BODY,
            RelayError::InvalidStudentId(_) => INVALID_STUDENT_ID,
            RelayError::MissingAccessToken => MISSING_ACCESS_TOKEN,
            RelayError::Upstream { message, .. } => *message,
            RelayError::InvalidUpstreamBody(_) => INVALID_UPSTREAM_BODY,
            RelayError::Timeout(_) => UPSTREAM_TIMED_OUT,
            RelayError::Transport(_) => UPSTREAM_FAILED,
            RelayError::InvalidUrl(_) => INTERNAL_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && !matches!(self, RelayError::Upstream { .. }) {
            tracing::error!(error = %self, status = %status, "Forwarding failed");
        }
        error_response(status, self.public_message())
    }
}

/// Failure building the upstream client at startup.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid value for {field}: {source}")]
    Header {
        field: &'static str,
        #[source]
        source: InvalidHeaderValue,
    },
}
