//! Connection information forwarded to middleware

use std::net::SocketAddr;

/// Addresses of the connection a request arrived on.
///
/// The router never inspects this value; it is handed to every middleware
/// layer as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnInfo {
    pub local_addr: Option<SocketAddr>,
    pub remote_addr: Option<SocketAddr>,
}

impl ConnInfo {
    pub fn new(local_addr: SocketAddr, remote_addr: SocketAddr) -> Self {
        Self {
            local_addr: Some(local_addr),
            remote_addr: Some(remote_addr),
        }
    }

    /// Connection info for requests that did not come off a socket
    pub fn detached() -> Self {
        Self::default()
    }
}
