//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → axum::serve accept loop
//!     → connection.rs (record remote + local address)
//!     → Hand off to HTTP layer as ConnectInfo<PeerAddrs>
//! ```

pub mod connection;

pub use connection::PeerAddrs;
