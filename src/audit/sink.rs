//! Destination for completed audit records and request-scoped errors.

use std::error::Error;

use crate::audit::record::AuditRecord;

/// Reporter capability handed to the audit middleware.
///
/// Shared by every in-flight call, so implementations must be safe for
/// concurrent use.
pub trait AuditSink: Send + Sync + 'static {
    /// Emit one completed request/response pair.
    fn log_request(&self, record: &AuditRecord);

    /// Report a recoverable failure; the call continues afterwards.
    fn report(&self, error: &dyn Error, message: &str);
}

/// Emits records as `tracing` events on the `strapi_hook::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn log_request(&self, record: &AuditRecord) {
        tracing::info!(
            target: "strapi_hook::audit",
            host = %record.host,
            method = %record.method,
            url = %record.url,
            agent = %record.user_agent,
            referer = %record.referer,
            protocol = %record.protocol,
            remote_ip = %record.remote_ip,
            server_ip = %record.server_ip,
            status = record.status.as_u16(),
            request = %record.request_json(),
            response = %record.response_json(),
            "request audited"
        );
    }

    fn report(&self, error: &dyn Error, message: &str) {
        tracing::error!(target: "strapi_hook::audit", error = %error, "{}", message);
    }
}
