//! Authentication module for the hipperger API
//!
//! Bearer token validation against the Auth0 tenant's published key set.

pub mod jwks;
pub mod jwt_validator;

// Re-export commonly used types and functions
pub use jwks::{
    HttpKeySource, Jwk, JwkSet, JwksCache, JwksCacheOptions, KeyLookupError, KeySource,
    KeySourceError, SigningKey,
};
pub use jwt_validator::{AuthError, Claims, TokenGatekeeper};
