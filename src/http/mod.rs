//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route binding)
//!     → request.rs (request ID, Authorization extraction)
//!     → [forwarding handlers]
//!     → response.rs (verbatim JSON pass-through or {"error": ...})
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRelayRequestId, X_REQUEST_ID};
pub use server::{RelayServer, RelayState};
