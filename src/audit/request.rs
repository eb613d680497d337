//! Request side of the audit.
//!
//! # Responsibilities
//! - Buffer the inbound body and hand back a replayable copy
//! - Fill the request half of an [`AuditRecord`]
//!
//! # Design Decisions
//! - The whole body is held in memory, bounded by `limits.max_body_size`
//! - A body over the limit or not delivered in time is rejected with 413 or 408,
//!   never relayed
//! - Any other failed read is reported and treated as an empty body
//! - Only the logged representation is JSON-escaped, never the forwarded bytes

use axum::{
    body::{Body, Bytes},
    extract::ConnectInfo,
    http::{header, HeaderMap, HeaderName, Request, StatusCode},
};
use http_body_util::LengthLimitError;
use std::borrow::Cow;
use std::error::Error;
use std::time::Duration;

use crate::audit::record::{encode_for_log, ip_from_host_port, AuditRecord};
use crate::audit::sink::AuditSink;
use crate::net::PeerAddrs;

/// Why a request body was refused instead of relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRejection {
    /// Body exceeded `limits.max_body_size`.
    TooLarge,
    /// Body was not complete within the read deadline.
    TimedOut,
}

impl BodyRejection {
    pub fn status(self) -> StatusCode {
        match self {
            BodyRejection::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            BodyRejection::TimedOut => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

/// Read the request body and build the request half of the audit record.
///
/// Returns the record together with a request whose body yields exactly the
/// original bytes, or the reason the body was refused.
pub async fn audit_request(
    request: Request<Body>,
    max_body_size: usize,
    read_timeout: Duration,
    sink: &dyn AuditSink,
) -> (AuditRecord, Result<Request<Body>, BodyRejection>) {
    let (parts, body) = request.into_parts();

    let read = tokio::time::timeout(read_timeout, axum::body::to_bytes(body, max_body_size)).await;
    let (body_bytes, rejection) = match read {
        Ok(Ok(bytes)) => (bytes, None),
        Ok(Err(e)) if exceeds_limit(&e) => {
            sink.report(&e, "Request body exceeds size limit");
            (Bytes::new(), Some(BodyRejection::TooLarge))
        }
        Ok(Err(e)) => {
            sink.report(&e, "Unable to read request body");
            (Bytes::new(), None)
        }
        Err(elapsed) => {
            sink.report(&elapsed, "Timed out reading request body");
            (Bytes::new(), Some(BodyRejection::TimedOut))
        }
    };

    let host = match header_str(&parts.headers, header::HOST) {
        "" => parts.uri.authority().map(|a| a.as_str()).unwrap_or_default(),
        host => host,
    };

    let peer = parts.extensions.get::<ConnectInfo<PeerAddrs>>().map(|ci| &ci.0);

    let record = AuditRecord {
        method: parts.method.to_string(),
        url: parts.uri.to_string(),
        user_agent: header_str(&parts.headers, header::USER_AGENT).to_string(),
        referer: header_str(&parts.headers, header::REFERER).to_string(),
        protocol: format!("{:?}", parts.version),
        host: host.to_string(),
        remote_ip: peer
            .map(|p| ip_from_host_port(&p.remote.to_string()))
            .unwrap_or_default(),
        server_ip: peer
            .and_then(|p| p.local)
            .map(|local| ip_from_host_port(&local.to_string()))
            .unwrap_or_default(),
        request_body: match encode_for_log(&body_bytes) {
            Cow::Borrowed(_) => body_bytes.clone(),
            Cow::Owned(quoted) => Bytes::from(quoted),
        },
        ..Default::default()
    };

    let request = match rejection {
        None => Ok(Request::from_parts(parts, Body::from(body_bytes))),
        Some(rejection) => Err(rejection),
    };
    (record, request)
}

fn exceeds_limit(error: &axum::Error) -> bool {
    let mut current: Option<&(dyn Error + 'static)> = Some(error);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
