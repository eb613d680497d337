//! strapi-hook
//!
//! An audited webhook gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Webhook producer            ┌──────────────────────────────────────────────┐
//!     ────────────────────────────┼─▶ /strapi                                    │
//!                                 │   ┌───────────┐   ┌──────────┐   ┌─────────┐ │
//!                                 │   │  audit    │──▶│ dispatch │──▶│ forward │─┼──▶ Target
//!                                 │   │ request + │   │ by method│   │  POST   │ │
//!     ◀───────────────────────────┼───│ recorder  │◀──│ 403 / 501│◀──│         │◀┼─── 
//!                                 │   └─────┬─────┘   └──────────┘   └─────────┘ │
//!                                 │         ▼                                    │
//!                                 │   one audit event per call                   │
//!                                 └──────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use strapi_hook::audit::TracingSink;
use strapi_hook::config::Cli;
use strapi_hook::http::HttpServer;
use strapi_hook::lifecycle::{wait_for_shutdown_signal, Shutdown};
use strapi_hook::observability::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let resolved = cli.resolve()?;
    let config = resolved.config;

    init_logging(&config.observability);

    tracing::info!("strapi-hook v{} starting", env!("CARGO_PKG_VERSION"));

    if let Some(file) = &resolved.file {
        tracing::info!(path = %file.display(), "Using config file");
    }

    tracing::info!(
        port = config.port(),
        target_uri = %config.target(),
        path = %config.path,
        "Configuration loaded"
    );

    let bind_address = config.bind_address();
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %bind_address, error = %e, "Error while listening for requests");
            std::process::exit(1);
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.signal();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, Arc::new(TracingSink))?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
