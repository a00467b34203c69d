//! Startup orchestration.
//!
//! Fail fast: any startup error is fatal. The listener binds last, so traffic
//! only arrives once the upstream client is ready.

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::RelayConfig;
use crate::forwarding::ClientBuildError;
use crate::http::RelayServer;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] ClientBuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start every subsystem and serve until `shutdown` fires.
///
/// Subscribe before installing signal handlers: a trigger sent while startup
/// is still binding is then delivered once the server runs.
pub async fn launch(
    config: RelayConfig,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        // Validation guarantees the address parses when metrics are enabled.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    tracing::info!(
        token_url = %config.upstream.token_url,
        student_details_url = %config.upstream.student_details_url,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let address = config.listener.bind_address.clone();
    let server = RelayServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    server
        .run(listener, shutdown)
        .await
        .map_err(StartupError::Serve)
}
