//! Upstream client for the student-information API.
//!
//! # Responsibilities
//! - Issue the token POST with the fixed `Origin`/`Referer` headers
//! - Issue the per-student details GET with the caller's `Authorization`
//! - Enforce connect and total deadlines on every call
//!
//! Exactly one request per call. No retries, no caching.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{header, HeaderValue, StatusCode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::schema::STUDENT_ID_PLACEHOLDER;
use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::forwarding::error::{ClientBuildError, RelayError};
use crate::observability::metrics;

/// Inbound token request body.
///
/// `email` is the canonical field; `username` is accepted for callers built
/// against the older schema.
#[derive(Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default, alias = "username")]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl TokenRequest {
    /// Credentials if both fields are present and non-empty.
    pub fn into_credentials(self) -> Option<Credentials> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(Credentials { email, password })
            }
            _ => None,
        }
    }
}

/// Credentials as sent upstream: `{"email": ..., "password": ...}`.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Status and raw body of an upstream reply.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Client for the two upstream endpoints. Cheap to clone.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    endpoints: Arc<Endpoints>,
}

struct Endpoints {
    token_url: String,
    student_details_url: String,
    origin: HeaderValue,
    referer: HeaderValue,
}

impl UpstreamClient {
    /// Build a client from validated configuration.
    pub fn new(
        upstream: &UpstreamConfig,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, ClientBuildError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .user_agent(upstream.user_agent.as_str())
            .build()?;

        let header_value = |field: &'static str, value: &str| {
            HeaderValue::from_str(value).map_err(|source| ClientBuildError::Header { field, source })
        };

        let endpoints = Endpoints {
            token_url: upstream.token_url.clone(),
            student_details_url: upstream.student_details_url.clone(),
            origin: header_value("upstream.origin", &upstream.origin)?,
            referer: header_value("upstream.referer", &upstream.referer)?,
        };

        Ok(Self {
            http,
            endpoints: Arc::new(endpoints),
        })
    }

    /// POST the credentials to the token endpoint.
    pub async fn request_token(
        &self,
        credentials: &Credentials,
    ) -> Result<UpstreamResponse, RelayError> {
        let request = self
            .http
            .post(&self.endpoints.token_url)
            .header(header::ORIGIN, self.endpoints.origin.clone())
            .header(header::REFERER, self.endpoints.referer.clone())
            .json(credentials);

        send("token", request).await
    }

    /// GET the details of `student_id`, forwarding `authorization` unchanged.
    pub async fn student_details(
        &self,
        student_id: &str,
        authorization: &HeaderValue,
    ) -> Result<UpstreamResponse, RelayError> {
        let url = details_url(&self.endpoints.student_details_url, student_id)?;
        let request = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, authorization.clone());

        send("student_details", request).await
    }
}

/// Substitute `student_id` into the details template as one path segment.
pub fn details_url(template: &str, student_id: &str) -> Result<Url, url::ParseError> {
    Url::parse(&template.replace(STUDENT_ID_PLACEHOLDER, &urlencoding::encode(student_id)))
}

async fn send(
    operation: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<UpstreamResponse, RelayError> {
    let start = Instant::now();

    let result = async {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>(UpstreamResponse { status, body })
    }
    .await;

    match &result {
        Ok(response) => metrics::record_upstream(operation, Some(response.status), start),
        Err(_) => metrics::record_upstream(operation, None, start),
    }

    Ok(result?)
}
