//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. Validation is a pure function
//! that reports every problem it finds rather than stopping at the first.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::{RelayConfig, STUDENT_ID_PLACEHOLDER};

/// A single semantic problem in a [`RelayConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a valid URL ({value}): {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} must use http or https, got '{scheme}'")]
    UnsupportedScheme { field: &'static str, scheme: String },

    #[error("upstream.student_details_url must contain {{student_id}} exactly once, found {0}")]
    StudentIdPlaceholder(usize),

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.request_secs ({request_secs}) must exceed timeouts.upstream_secs ({upstream_secs})")]
    DeadlineOrder { request_secs: u64, upstream_secs: u64 },

    #[error("listener.path_prefix must be empty or start with '/' and not end with '/', got '{0}'")]
    InvalidPathPrefix(String),

    #[error("{0} is not a valid HTTP header value")]
    InvalidHeader(&'static str),
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let prefix = &config.listener.path_prefix;
    if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
        errors.push(ValidationError::InvalidPathPrefix(prefix.clone()));
    }

    let upstream = &config.upstream;
    check_url("upstream.token_url", &upstream.token_url, &mut errors);

    let placeholders = upstream.student_details_url.matches(STUDENT_ID_PLACEHOLDER).count();
    if placeholders != 1 {
        errors.push(ValidationError::StudentIdPlaceholder(placeholders));
    }
    let sample = upstream
        .student_details_url
        .replace(STUDENT_ID_PLACEHOLDER, "0");
    check_url("upstream.student_details_url", &sample, &mut errors);

    for (field, value) in [
        ("upstream.origin", &upstream.origin),
        ("upstream.referer", &upstream.referer),
        ("upstream.user_agent", &upstream.user_agent),
    ] {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeader(field));
        }
    }

    for (field, secs) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::ZeroTimeout(field));
        }
    }

    // The inbound deadline must outlive the upstream one or callers get a bare 408.
    let timeouts = &config.timeouts;
    if timeouts.upstream_secs > 0 && timeouts.request_secs <= timeouts.upstream_secs {
        errors.push(ValidationError::DeadlineOrder {
            request_secs: timeouts.request_secs,
            upstream_secs: timeouts.upstream_secs,
        });
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::UnsupportedScheme {
            field,
            scheme: url.scheme().to_string(),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
