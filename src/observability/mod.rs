//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (diagnostics, errors)
//!     → audit events via crate::audit::TracingSink
//!
//! Consumer:
//!     → logging.rs (fmt layer, text or JSON, to stdout)
//! ```

pub mod logging;

pub use logging::init_logging;
