//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → RELAY_* environment overrides (loader.rs)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → consumed by the upstream client and server at startup
//! ```
//!
//! Config is built once at startup and never mutated afterwards.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, RelayConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
