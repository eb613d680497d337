//! Shared utilities for integration testing.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use tokio::net::TcpListener;

use strapi_hook::{AuditRecord, AuditSink, GatewayConfig, HttpServer, Shutdown};

/// Audit sink that keeps everything in memory.
#[derive(Default)]
pub struct MemorySink {
    pub records: Mutex<Vec<AuditRecord>>,
    pub errors: Mutex<Vec<String>>,
}

impl AuditSink for MemorySink {
    fn log_request(&self, record: &AuditRecord) {
        self.records.lock().unwrap().push(record.clone());
    }

    fn report(&self, error: &dyn Error, message: &str) {
        self.errors.lock().unwrap().push(format!("{message}: {error}"));
    }
}

/// What the mock target received.
#[derive(Debug, Clone)]
pub struct Received {
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Start a mock target on `/api` answering every POST with `status` and `body`.
pub async fn start_mock_target(
    status: u16,
    body: &'static str,
) -> (SocketAddr, Arc<Mutex<Vec<Received>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let seen = received.clone();

    let app = Router::new().route(
        "/api",
        post(move |headers: HeaderMap, payload: Bytes| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(Received {
                    headers,
                    body: payload,
                });
                (
                    StatusCode::from_u16(status).unwrap(),
                    [("content-type", "application/json"), ("x-target", "mock")],
                    body,
                )
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, received)
}

/// Start a target on `/api` that answers only after `delay`.
pub async fn start_slow_target(delay: Duration) -> SocketAddr {
    let app = Router::new().route(
        "/api",
        post(move || async move {
            tokio::time::sleep(delay).await;
            "{}"
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Start the gateway on a free local port.
pub async fn start_gateway(config: GatewayConfig, sink: Arc<MemorySink>) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, sink).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let signal = shutdown.signal();

    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}

/// A client that never reuses connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
