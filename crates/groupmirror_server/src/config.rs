//! Server configuration.

use crate::auth::BasicAuth;
use std::net::SocketAddr;

/// Port the API listens on by default.
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Login accepted on every API route.
    pub auth: BasicAuth,
}

impl ServerConfig {
    /// Creates a configuration listening on all interfaces at the default port.
    pub fn new(auth: BasicAuth) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            auth,
        }
    }

    /// Sets the bind address.
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    /// Sets the port, keeping the bind interface.
    pub fn with_port(mut self, port: u16) -> Self {
        self.bind_addr.set_port(port);
        self
    }
}
