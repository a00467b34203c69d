//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_upstream_requests_total` (counter): upstream calls by operation
//!   and status (`error` when no response arrived)
//! - `relay_upstream_duration_seconds` (histogram): upstream call latency
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::StatusCode;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!(
        "relay_upstream_requests_total",
        "Upstream calls by operation and status"
    );
    describe_histogram!(
        "relay_upstream_duration_seconds",
        "Upstream call latency in seconds"
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one upstream call.
pub fn record_upstream(operation: &'static str, status: Option<StatusCode>, start: Instant) {
    counter!(
        "relay_upstream_requests_total",
        "operation" => operation,
        "status" => status_label(status)
    )
    .increment(1);

    histogram!("relay_upstream_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

fn status_label(status: Option<StatusCode>) -> String {
    match status {
        Some(status) => status.as_u16().to_string(),
        None => "error".to_string(),
    }
}
