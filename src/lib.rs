//! Audited webhook gateway library.
//!
//! One endpoint (`/strapi` by default) accepts webhook calls, records every
//! request/response pair as a single audit event and relays POST calls to
//! the configured target.

pub mod audit;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use audit::{AuditRecord, AuditSink, TracingSink};
pub use config::{Cli, GatewayConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
