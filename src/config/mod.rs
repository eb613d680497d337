//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! flags / STRAPI_HOOK_* env (cli.rs, via clap)
//!     + config file (loader.rs, TOML)
//!     + built-in defaults (schema.rs)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to the server and forwarder
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never mutated while serving
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::{Cli, ResolvedConfig};
pub use loader::ConfigError;
pub use schema::{GatewayConfig, LogFormat};
