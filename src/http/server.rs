//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the single audited endpoint
//! - Wire up middleware (audit, timeout, tracing)
//! - Bind server to listener with per-connection address info
//! - Serve until the shutdown signal fires

use axum::{http::StatusCode, routing::any, Router};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::audit::{AuditLayer, AuditSink};
use crate::config::GatewayConfig;
use crate::http::dispatch::dispatch;
use crate::http::forward::{ForwardError, Forwarder};
use crate::net::PeerAddrs;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server reporting audit records to `sink`.
    pub fn new(config: GatewayConfig, sink: Arc<dyn AuditSink>) -> Result<Self, ForwardError> {
        let forwarder = Forwarder::new(config.target(), &config.timeouts)?;
        let state = AppState { forwarder };

        let router = Self::build_router(&config, state, sink);
        Ok(Self {
            router,
            config: Arc::new(config),
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The audit layer is outermost so that calls cut by the deadline are
    /// still recorded.
    fn build_router(config: &GatewayConfig, state: AppState, sink: Arc<dyn AuditSink>) -> Router {
        let deadline = Duration::from_secs(config.timeouts.request_secs);
        Router::new()
            .route(&config.path, any(dispatch))
            .route_layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, deadline))
            .route_layer(AuditLayer::new(sink, config.limits.max_body_size, deadline))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the server without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` completes.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.path,
            target_uri = %self.config.target(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<PeerAddrs>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
