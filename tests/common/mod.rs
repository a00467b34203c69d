//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use student_relay::config::RelayConfig;
use student_relay::{RelayServer, Shutdown};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use wiremock::MockServer;

pub const TOKEN_PATH: &str = "/v3/account/token";

/// A relay running on an ephemeral port. Shuts down on drop.
pub struct TestRelay {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Relay configuration pointing both endpoints at `upstream`.
pub fn config_for(upstream: &MockServer) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.token_url = format!("{}{}", upstream.uri(), TOKEN_PATH);
    config.upstream.student_details_url = format!(
        "{}/api/v2/profile/{{student_id}}/load-student-details",
        upstream.uri()
    );
    config
}

/// Start a relay with `config` and wait until it accepts connections.
pub async fn start_relay(config: RelayConfig) -> TestRelay {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = RelayServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestRelay { addr, shutdown }
}

/// Client that never reuses connections or honours proxy env vars.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Upstream that accepts one connection, reads but never answers, and
/// signals once the peer closes the connection.
pub async fn start_silent_upstream() -> (SocketAddr, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = closed_tx.send(());
    });

    (addr, closed_rx)
}
