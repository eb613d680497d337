//! Audit middleware.
//!
//! Wraps any inner service so that every call produces exactly one
//! [`AuditRecord`](crate::audit::AuditRecord), emitted once the response is
//! fully known:
//! - the request body is captured and replaced by a replayable copy
//! - the inner service runs, its response is drained into a [`ResponseRecorder`];
//!   a refused body answers 413 or 408 without running it
//! - the recorder releases an identical response to the caller
//! - the completed record goes to the [`AuditSink`]

use axum::{body::Body, extract::Request, response::Response};
use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
use tower::{Layer, Service};

use crate::audit::recorder::ResponseRecorder;
use crate::audit::request::audit_request;
use crate::audit::sink::AuditSink;
use crate::http::response::plain_status;

/// Audit logging layer.
#[derive(Clone)]
pub struct AuditLayer {
    sink: Arc<dyn AuditSink>,
    max_body_size: usize,
    read_timeout: Duration,
}

impl AuditLayer {
    /// Create a new audit layer reporting to `sink`.
    pub fn new(sink: Arc<dyn AuditSink>, max_body_size: usize, read_timeout: Duration) -> Self {
        Self {
            sink,
            max_body_size,
            read_timeout,
        }
    }
}

impl<S> Layer<S> for AuditLayer {
    type Service = AuditMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuditMiddleware {
            inner,
            sink: self.sink.clone(),
            max_body_size: self.max_body_size,
            read_timeout: self.read_timeout,
        }
    }
}

/// Audit middleware service.
#[derive(Clone)]
pub struct AuditMiddleware<S> {
    inner: S,
    sink: Arc<dyn AuditSink>,
    max_body_size: usize,
    read_timeout: Duration,
}

impl<S> Service<Request> for AuditMiddleware<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // Take the service that was driven to readiness, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let sink = self.sink.clone();
        let max_body_size = self.max_body_size;
        let read_timeout = self.read_timeout;

        Box::pin(async move {
            let (mut record, request) =
                audit_request(request, max_body_size, read_timeout, sink.as_ref()).await;

            let mut recorder = ResponseRecorder::new();
            let response: Response<Body> = match request {
                Ok(request) => match inner.call(request).await {
                    Ok(response) => response,
                    Err(never) => match never {},
                },
                Err(rejection) => plain_status(rejection.status()),
            };
            recorder.capture(response, sink.as_ref()).await;

            let (status, body, response) = recorder.finish();
            record.status = status;
            record.response_body = body;
            sink.log_request(&record);

            Ok(response)
        })
    }
}
