//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the student identifier in
/// [`UpstreamConfig::student_details_url`].
pub const STUDENT_ID_PLACEHOLDER: &str = "{student_id}";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, route prefix).
    pub listener: ListenerConfig,

    /// Upstream student-information endpoints.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Extra prefix the routes are mounted under in addition to the root.
    /// Empty disables the prefixed mount.
    pub path_prefix: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            path_prefix: "/api".to_string(),
        }
    }
}

/// Upstream endpoints and the fixed headers the upstream requires.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Token issuance endpoint (POST).
    pub token_url: String,

    /// Student details endpoint template (GET). Must contain
    /// `{student_id}` exactly once.
    pub student_details_url: String,

    /// `Origin` header sent with token requests.
    pub origin: String,

    /// `Referer` header sent with token requests.
    pub referer: String,

    /// `User-Agent` sent with every upstream request.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            token_url: "https://iras.iub.edu.bd:8079/v3/account/token".to_string(),
            student_details_url:
                "https://iras.iub.edu.bd:8079/api/v2/profile/{student_id}/load-student-details"
                    .to_string(),
            origin: "https://irasv1.iub.edu.bd".to_string(),
            referer: "https://irasv1.iub.edu.bd/".to_string(),
            user_agent: concat!("student-relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Timeout configuration, all in seconds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout.
    pub connect_secs: u64,

    /// Total deadline for one upstream call (connect, send, read body).
    pub upstream_secs: u64,

    /// Deadline for a whole inbound request. Should exceed `upstream_secs`
    /// so upstream timeouts surface as 504 rather than 408.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            request_secs: 35,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
