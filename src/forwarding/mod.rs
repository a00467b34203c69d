//! Forwarding subsystem: the relay's only business logic.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → handlers.rs (presence checks, no upstream call on failure)
//!     → client.rs (one upstream HTTPS call with deadlines)
//!     → handlers.rs (200 → body verbatim, else upstream status + fixed message)
//!     → error.rs (every failure rendered as {"error": "..."})
//! ```
//!
//! Credentials, tokens and student ids are relayed, never inspected or stored.

pub mod client;
pub mod error;
pub mod handlers;

pub use client::{Credentials, TokenRequest, UpstreamClient, UpstreamResponse};
pub use error::{ClientBuildError, RelayError};
