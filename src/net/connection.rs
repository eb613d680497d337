//! Per-connection address information.
//!
//! # Responsibilities
//! - Capture the peer and local address of every accepted connection
//! - Expose them to handlers through `ConnectInfo<PeerAddrs>`

use std::net::SocketAddr;

use axum::{extract::connect_info::Connected, serve::IncomingStream};
use tokio::net::TcpListener;

/// Addresses of one accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAddrs {
    /// Address of the caller.
    pub remote: SocketAddr,
    /// Address the connection was accepted on, when the socket reports it.
    pub local: Option<SocketAddr>,
}

impl Connected<IncomingStream<'_, TcpListener>> for PeerAddrs {
    fn connect_info(stream: IncomingStream<'_, TcpListener>) -> Self {
        Self {
            remote: *stream.remote_addr(),
            local: stream.io().local_addr().ok(),
        }
    }
}
