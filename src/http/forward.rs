//! Relay of accepted calls to the configured target.
//!
//! # Responsibilities
//! - POST the audited, replayable body to the target URL
//! - Return the target's status, headers and body unchanged
//! - Map upstream failures to gateway status codes
//!
//! # Design Decisions
//! - HTTP only, via hyper-util's pooled client
//! - Every exchange has a deadline; a timeout answers 504, other failures 502
//! - No retries: webhook deliveries are not idempotent
//! - The upstream body is fully buffered before it is handed back

use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, uri::InvalidUri, HeaderValue, Method, Request, Response, StatusCode, Uri},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::schema::TimeoutConfig;
use crate::http::headers::{append_forwarded_for, strip_hop_by_hop};
use crate::http::response::plain_status;
use crate::net::PeerAddrs;

/// Errors that can occur while relaying a call.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Configured target is not a valid URI.
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] InvalidUri),

    /// Outbound request could not be built.
    #[error("invalid upstream request: {0}")]
    Request(#[from] axum::http::Error),

    /// Connection or protocol failure talking to the target.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// Upstream response body could not be read.
    #[error("failed to read upstream response: {0}")]
    Body(#[from] axum::Error),

    /// Exchange did not complete in time.
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
}

impl ForwardError {
    /// Status reported to the caller for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Relays calls to one upstream target.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    target: Uri,
    timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder for `target` with the configured deadlines.
    pub fn new(target: &str, timeouts: &TimeoutConfig) -> Result<Self, ForwardError> {
        let target: Uri = target.parse()?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            target,
            timeout: Duration::from_secs(timeouts.upstream_secs),
        })
    }

    /// Relay `request`; failures become a plain-text 502 or 504.
    pub async fn forward(&self, request: Request<Body>) -> Response<Body> {
        match self.try_forward(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(target_uri = %self.target, error = %e, "Upstream error");
                plain_status(e.status())
            }
        }
    }

    async fn try_forward(&self, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        let (parts, body) = request.into_parts();

        let client_ip = parts
            .extensions
            .get::<ConnectInfo<PeerAddrs>>()
            .map(|ci| ci.0.remote.ip().to_string())
            .unwrap_or_default();

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        // Recomputed from the replayed body.
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::HOST);
        if let Some(authority) = self.target.authority() {
            if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
                headers.insert(header::HOST, host);
            }
        }
        append_forwarded_for(&mut headers, &client_ip);

        let mut outbound = Request::builder()
            .method(Method::POST)
            .uri(self.target.clone())
            .body(body)?;
        *outbound.headers_mut() = headers;

        tracing::debug!(target_uri = %self.target, "Forwarding request");

        let exchange = async {
            let response = self.client.request(outbound).await?;
            let (mut parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(Body::new(body), usize::MAX).await?;
            strip_hop_by_hop(&mut parts.headers);
            Ok::<_, ForwardError>(Response::from_parts(parts, Body::from(bytes)))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ForwardError::Timeout(self.timeout))?
    }
}
