//! # hipperger API
//!
//! Authentication glue for the hipperger backend.
//!
//! - **Login forwarding**: `POST /api/v1/login` trades a username and password
//!   for an Auth0 access token and relays the provider's answer.
//! - **Token gatekeeping**: protected routes require an RS256 bearer token
//!   signed by the Auth0 tenant, checked against a cached, rate-limited key set.
//! - **Local signup** (off by default): Argon2id-hashed credentials in
//!   Postgres or process memory.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;

pub use config::Config;
pub use error::{ApiError, Result};
pub use server::{build_router, AppState, Server};

/// Version of the hipperger-api crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
