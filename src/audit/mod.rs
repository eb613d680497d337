//! Request/response interception and audit logging.
//!
//! # Data Flow
//! ```text
//! inbound call
//!     → middleware.rs (AuditLayer wraps the endpoint)
//!     → request.rs (buffer body, replayable copy, request half of record)
//!     → inner handler runs (skipped when the body is refused: 413 / 408)
//!     → recorder.rs (drain response into memory, release it unchanged)
//!     → record.rs (response half: status + body)
//!     → sink.rs (one event per call)
//! ```
//!
//! # Design Decisions
//! - One record per call, owned by that call only
//! - The caller and the inner handler never see altered payloads
//! - Auditing failures are reported and never block delivery; only an
//!   oversized or stalled body is refused, and that refusal is audited too

pub mod middleware;
pub mod record;
pub mod recorder;
pub mod request;
pub mod sink;

pub use middleware::{AuditLayer, AuditMiddleware};
pub use record::{encode_for_log, ip_from_host_port, AuditRecord};
pub use recorder::ResponseRecorder;
pub use request::{audit_request, BodyRejection};
pub use sink::{AuditSink, TracingSink};
