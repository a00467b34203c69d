//! Student information relay library.
//!
//! Forwards token and student-details requests to a fixed upstream API and
//! relays its JSON answers back unchanged.

pub mod config;
pub mod forwarding;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
