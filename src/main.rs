//! Student information relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!                         │                STUDENT RELAY                  │
//!     Client Request      │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│forwarding│───▶│ upstream │──┼──▶ Upstream
//!                         │  │ server  │    │ handlers │    │  client  │  │    API
//!     Client Response     │  └─────────┘    └──────────┘    └──────────┘  │
//!     ◀───────────────────┼──  200: body verbatim / else {"error": ...}  ◀─┼───
//!                         │                                               │
//!                         │  config · observability · lifecycle           │
//!                         └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use student_relay::config::{resolve_config, validate_config, ConfigError};
use student_relay::lifecycle::{launch, Shutdown};
use student_relay::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "student-relay", version)]
#[command(about = "Relay for the student-information API", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = resolve_config(cli.config.as_deref(), |key| std::env::var(key).ok())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    init_logging(&config.observability)?;
    tracing::info!("student-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    shutdown.trigger_on_signal();

    launch(config, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
