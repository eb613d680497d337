//! The audit record and helpers shared by both halves of the capture.

use std::borrow::Cow;

use axum::http::StatusCode;
use bytes::Bytes;

/// One captured request/response pair.
///
/// Filled in two steps: the request half by [`crate::audit::request::audit_request`],
/// then the response half by the middleware once the inner handler returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub method: String,
    pub url: String,
    pub user_agent: String,
    pub referer: String,
    pub protocol: String,
    pub host: String,
    pub remote_ip: String,
    pub server_ip: String,
    /// Logged representation of the request payload, see [`encode_for_log`].
    pub request_body: Bytes,
    pub status: StatusCode,
    /// Payload bytes as sent to the caller.
    pub response_body: Bytes,
}

impl Default for AuditRecord {
    fn default() -> Self {
        Self {
            method: String::new(),
            url: String::new(),
            user_agent: String::new(),
            referer: String::new(),
            protocol: String::new(),
            host: String::new(),
            remote_ip: String::new(),
            server_ip: String::new(),
            request_body: Bytes::new(),
            status: StatusCode::OK,
            response_body: Bytes::new(),
        }
    }
}

impl AuditRecord {
    /// Request payload as it should appear in a structured log.
    pub fn request_json(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.request_body)
    }

    /// Response payload as it should appear in a structured log.
    pub fn response_json(&self) -> Cow<'_, str> {
        match encode_for_log(&self.response_body) {
            Cow::Borrowed(raw) => String::from_utf8_lossy(raw),
            Cow::Owned(quoted) => Cow::Owned(String::from_utf8_lossy(&quoted).into_owned()),
        }
    }
}

/// Keep valid JSON as is; render anything else as a JSON string literal.
///
/// The result is always embeddable as raw JSON. Empty input is not valid JSON
/// and becomes `""`. Text that is not UTF-8 is byte-escaped first (`\xNN`,
/// `\\`), so the logged value still identifies every input byte.
pub fn encode_for_log(body: &[u8]) -> Cow<'_, [u8]> {
    let text = match std::str::from_utf8(body) {
        Ok(text) => {
            if serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok() {
                return Cow::Borrowed(body);
            }
            Cow::Borrowed(text)
        }
        Err(_) => Cow::Owned(body.escape_ascii().to_string()),
    };
    // Serializing a str cannot fail.
    let quoted = serde_json::to_vec(&*text).unwrap_or_else(|_| b"\"\"".to_vec());
    Cow::Owned(quoted)
}

/// Host part of a `host:port` address, with IPv6 brackets removed.
///
/// Returns an empty string when `addr` has no port.
pub fn ip_from_host_port(addr: &str) -> String {
    let host = if let Some(rest) = addr.strip_prefix('[') {
        match rest.split_once(']') {
            Some((host, tail)) if tail.starts_with(':') => host,
            _ => return String::new(),
        }
    } else {
        match addr.rsplit_once(':') {
            Some((host, _)) if !host.contains(':') => host,
            _ => return String::new(),
        }
    };
    host.to_string()
}
