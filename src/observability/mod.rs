//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and middleware produce:
//!     → logging.rs (structured tracing events, text or JSON)
//!     → metrics.rs (upstream call counters and latency histograms)
//!
//! Consumers:
//!     → stdout (log aggregation)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! Request IDs flow through every span. Credentials and tokens are never
//! recorded.

pub mod logging;
pub mod metrics;
