//! In-memory stand-in for the live response.
//!
//! # Responsibilities
//! - Accumulate status, headers and the full body of an inner handler's output
//! - Release the recorded response to the caller in one step
//!
//! # Design Decisions
//! - Nothing reaches the caller before the handler finished; no partial flush
//! - Status stays unset until written; an unset status resolves to 200
//! - The first status written wins, as on a real connection

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Response, StatusCode},
};
use bytes::BytesMut;
use http_body_util::BodyExt;

use crate::audit::sink::AuditSink;

/// Buffers one response until [`ResponseRecorder::finish`] is called.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the status code. Ignored once a status has been recorded.
    pub fn set_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(current) => {
                tracing::debug!(current = %current, ignored = %status, "Superfluous status write");
            }
        }
    }

    /// Append body bytes; implies `200 OK` if no status was recorded yet.
    pub fn write(&mut self, data: &[u8]) {
        if self.status.is_none() {
            self.set_status(StatusCode::OK);
        }
        self.body.extend_from_slice(data);
    }

    /// Record a handler's response, draining its body completely.
    ///
    /// A body error is reported and whatever was read before it is kept.
    pub async fn capture(&mut self, response: Response<Body>, sink: &dyn AuditSink) {
        let (parts, mut body) = response.into_parts();

        self.set_status(parts.status);
        self.headers.extend(parts.headers);

        while let Some(frame) = body.frame().await {
            match frame {
                Ok(frame) => {
                    if let Some(data) = frame.data_ref() {
                        self.write(data);
                    }
                }
                Err(e) => {
                    sink.report(&e, "Unable to read response body");
                    break;
                }
            }
        }
    }

    /// Effective status: the recorded one or 200.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Produce the live response and hand back the status and body it carries.
    pub fn finish(self) -> (StatusCode, Bytes, Response<Body>) {
        let status = self.status();
        let body = self.body.freeze();

        let mut response = Response::new(Body::from(body.clone()));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;

        (status, body, response)
    }
}
