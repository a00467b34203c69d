//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the startup configuration: the file at `path` (or defaults), then
/// environment overrides, then validation.
pub fn resolve_config<F>(path: Option<&Path>, env: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `RELAY_*` environment overrides on top of `config`.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let strings = [
        ("RELAY_BIND_ADDRESS", &mut config.listener.bind_address),
        ("RELAY_PATH_PREFIX", &mut config.listener.path_prefix),
        ("RELAY_TOKEN_URL", &mut config.upstream.token_url),
        ("RELAY_STUDENT_DETAILS_URL", &mut config.upstream.student_details_url),
        ("RELAY_UPSTREAM_ORIGIN", &mut config.upstream.origin),
        ("RELAY_UPSTREAM_REFERER", &mut config.upstream.referer),
        ("RELAY_LOG_LEVEL", &mut config.observability.log_level),
    ];
    for (var, slot) in strings {
        if let Some(value) = env(var) {
            *slot = value;
        }
    }

    let timeouts = [
        ("RELAY_UPSTREAM_TIMEOUT_SECS", &mut config.timeouts.upstream_secs),
        ("RELAY_REQUEST_TIMEOUT_SECS", &mut config.timeouts.request_secs),
    ];
    for (var, slot) in timeouts {
        if let Some(value) = env(var) {
            *slot = value.trim().parse().map_err(|e| ConfigError::Env {
                var,
                reason: format!("{e}"),
            })?;
        }
    }

    Ok(())
}
