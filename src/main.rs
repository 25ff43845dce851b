//! throttle-gate
//!
//! An IP admission control service built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                 THROTTLE GATE                     │
//!                     │                                                   │
//!   Client Request    │  ┌─────────┐    ┌────────────┐    ┌───────────┐  │
//!   ──────────────────┼─▶│  http   │───▶│ admission  │───▶│ windowed  │  │
//!                     │  │ server  │    │  decider   │    │  counter  │  │
//!                     │  └─────────┘    └─────┬──────┘    └───────────┘  │
//!                     │                       │                          │
//!                     │                       ▼                          │
//!   Client Response   │  ┌─────────┐    ┌────────────┐    ┌───────────┐  │
//!   ◀─────────────────┼──│ allow / │    │   audit    │───▶│   redis   │──┼──▶ Audit
//!                     │  │  deny   │    │  pipeline  │    │   store   │  │    Records
//!                     │  └─────────┘    └────────────┘    └───────────┘  │
//!                     │                                                   │
//!                     │  ┌─────────────────────────────────────────────┐ │
//!                     │  │            Cross-Cutting Concerns            │ │
//!                     │  │  ┌────────┐ ┌─────────────┐ ┌────────────┐  │ │
//!                     │  │  │ config │ │observability│ │ lifecycle  │  │ │
//!                     │  │  └────────┘ └─────────────┘ └────────────┘  │ │
//!                     │  └─────────────────────────────────────────────┘ │
//!                     └──────────────────────────────────────────────────┘
//! ```
//!
//! Two background loops run for the lifetime of the process: the counter
//! reset loop (fixed-window rollover) and the audit drain loop. Both
//! subscribe to the shutdown coordinator.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use throttle_gate::audit::store::RedisStore;
use throttle_gate::config::{load_config, GateConfig};
use throttle_gate::http::HttpServer;
use throttle_gate::lifecycle::{signals, startup, Shutdown};
use throttle_gate::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "throttle-gate", version, about = "IP admission control service")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    tracing::info!("throttle-gate v{} starting", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config_path = args
        .config
        .or_else(|| std::env::var_os("THROTTLE_GATE_CONFIG").map(PathBuf::from));

    let config = match config_path {
        Some(path) => load_config(&path)?,
        None => GateConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        quota = config.throttle.quota_per_window,
        window_secs = config.throttle.window_secs,
        queue_capacity = config.audit.queue_capacity,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // The service must not accept traffic without a working audit sink.
    let store = RedisStore::connect(
        &config.audit.redis_addr,
        config.audit.connect_max_attempts,
        Duration::from_secs(config.audit.connect_retry_secs),
    )
    .await?;

    let shutdown = Shutdown::new();
    let decider = startup::start_core(&config, store, &shutdown);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server = HttpServer::new(config, decider);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
