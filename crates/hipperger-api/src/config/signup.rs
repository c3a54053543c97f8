//! Local signup configuration

use serde::{Deserialize, Serialize};

/// Local username/password signup. Off unless explicitly enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupConfig {
    /// Mount `POST /api/v1/signup`
    pub enabled: bool,

    /// Postgres URL of the credential store. Without one, credentials are
    /// kept in process memory.
    pub database_url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl Default for SignupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            database_url: None,
            max_connections: 5,
        }
    }
}
