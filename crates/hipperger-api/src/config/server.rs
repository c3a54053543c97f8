//! HTTP server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub bind_address: SocketAddr,

    /// Inbound request timeout in seconds
    pub request_timeout: u64,

    /// Emit logs as JSON lines instead of the compact text format
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: ([0, 0, 0, 0], 8000).into(),
            request_timeout: 30,
            log_json: false,
        }
    }
}
