//! Shared building blocks for the hipperger auth gateway
//!
//! Holds the pieces every binary in the workspace needs: configuration
//! loading, logging initialization, and the Auth0 tenant constants.

pub mod auth_constants;
pub mod config;
pub mod error;
pub mod logging;

pub use auth_constants::{
    AUTH0_ALGORITHM, AUTH0_AUDIENCE, AUTH0_CONNECTION, AUTH0_DOMAIN, AUTH0_ISSUER, AUTH0_JWKS_URI,
};
pub use error::{ConfigurationError, HippergerError};
