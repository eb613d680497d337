//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, single route, middleware)
//!     → audit layer (see crate::audit)
//!     → dispatch.rs (classify by method)
//!     → forward.rs (POST only: relay to target)
//!     → headers.rs (hop-by-hop, X-Forwarded-For)
//!     → response.rs (plain-text status answers)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod forward;
pub mod headers;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use server::{AppState, HttpServer};
