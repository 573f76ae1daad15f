//! Blog gateway
//!
//! A thin layer between the blog frontend and the blog store.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 BLOG GATEWAY                 │
//!                       │                                              │
//!   Browser request     │  ┌────────┐    ┌──────────┐    ┌──────────┐  │
//!   ────────────────────┼─▶│  http  │───▶│ handlers │───▶│ upstream │──┼──▶ Blog store
//!                       │  │ server │    │          │    │  client  │  │    (BLOG_DB)
//!                       │  └────────┘    └────┬─────┘    └──────────┘  │
//!                       │                     │                        │
//!                       │                     ▼                        │
//!   Browser response    │  ┌──────────┐  ┌────────────┐                │
//!   ◀───────────────────┼──│ response │◀─│ pagination │                │
//!                       │  │ encoder  │  │ normalizer │                │
//!                       │  └──────────┘  └────────────┘                │
//!                       │                                              │
//!                       │  config · observability · lifecycle          │
//!                       └──────────────────────────────────────────────┘
//! ```

use blog_gateway::config;
use blog_gateway::http::HttpServer;
use blog_gateway::lifecycle::{signals, Shutdown};
use blog_gateway::observability::{logging, metrics};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_from_env()?;

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        blog_db = %config.upstream.blog_db,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.upstream.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address checked by config validation.
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
