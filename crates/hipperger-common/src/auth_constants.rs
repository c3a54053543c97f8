//! Auth0 tenant constants for hipperger authentication
//!
//! These are compiled in as defaults; every one of them can be overridden
//! through configuration.

/// Auth0 tenant domain
pub const AUTH0_DOMAIN: &str = "hipperger.us.auth0.com";

/// Expected `iss` claim of tokens accepted by the gatekeeper
pub const AUTH0_ISSUER: &str = "https://hipperger.us.auth0.com/";

/// Expected `aud` claim of tokens accepted by the gatekeeper
pub const AUTH0_AUDIENCE: &str = "my-express-app";

/// Signing algorithm accepted by the gatekeeper
pub const AUTH0_ALGORITHM: &str = "RS256";

/// Published key set of the tenant
pub const AUTH0_JWKS_URI: &str = "https://hipperger.us.auth0.com/.well-known/jwks.json";

/// Database connection used for username/password logins
pub const AUTH0_CONNECTION: &str = "Username-Password-Authentication";
