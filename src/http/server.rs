//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router binding the relay routes to their handlers
//! - Mount the routes at the root and under the configured path prefix
//! - Wire up middleware (request ID, tracing, inbound timeout)
//! - Serve on a listener until the shutdown signal fires

use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::forwarding::handlers::{fetch_student_details, health, issue_token};
use crate::forwarding::{ClientBuildError, UpstreamClient};
use crate::http::request::{request_id, MakeRelayRequestId};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct RelayState {
    pub upstream: UpstreamClient,
}

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a new server from validated configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ClientBuildError> {
        let upstream = UpstreamClient::new(&config.upstream, &config.timeouts)?;
        let router = Self::build_router(&config, RelayState { upstream });

        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: RelayState) -> Router {
        let routes = Router::new()
            .route("/token/", post(issue_token))
            .route("/student-details/{student_id}/", get(fetch_student_details))
            .route("/health", get(health));

        let prefix = config.listener.path_prefix.as_str();
        let router = if prefix.is_empty() {
            routes
        } else {
            routes.clone().nest(prefix, routes)
        };

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRelayRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        request_id = %request_id(request),
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.timeouts.request_secs,
                ))),
        )
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path_prefix = %self.config.listener.path_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
