//! JWT validation for Auth0-issued access tokens
//!
//! [`TokenGatekeeper`] verifies a bearer token's signature with a key
//! resolved from the provider's JWKS, then checks the algorithm, expiry,
//! audience, and issuer against fixed expectations.

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

use super::jwks::{HttpKeySource, JwksCache, JwksCacheOptions, KeyLookupError};
use crate::config::GatekeeperConfig;
use crate::error::ApiError;

/// Standard JWT claims that we validate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier); Auth0 always sets it but it is not required
    #[serde(default)]
    pub sub: Option<String>,
    /// Audience, a string or an array of strings
    pub aud: serde_json::Value,
    /// Issuer (who issued the token)
    pub iss: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: Option<u64>,
    /// Token scope/permissions
    #[serde(default)]
    pub scope: Option<String>,
    /// Custom claims
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Scopes from the space-separated `scope` claim
    pub fn scopes(&self) -> Vec<String> {
        self.scope
            .as_ref()
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }
}

/// Reasons a token is refused
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token signed with disallowed algorithm {0:?}")]
    DisallowedAlgorithm(Algorithm),

    #[error("JWT header missing key ID (kid)")]
    MissingKeyId,

    #[error("Key {kid} is bound to {expected:?} but the token uses {actual:?}")]
    KeyAlgorithmMismatch {
        kid: String,
        expected: Algorithm,
        actual: Algorithm,
    },

    #[error(transparent)]
    KeyLookup(#[from] KeyLookupError),

    #[error("JWT validation failed: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// True when the token could not be judged because keys were unavailable
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AuthError::KeyLookup(e) if e.is_unavailable())
    }
}

/// Validates bearer tokens for protected routes
pub struct TokenGatekeeper {
    keys: Arc<JwksCache>,
    algorithms: Vec<Algorithm>,
    validation: Validation,
}

impl TokenGatekeeper {
    /// Create a gatekeeper over an existing key cache
    pub fn new(config: &GatekeeperConfig, keys: Arc<JwksCache>) -> Self {
        let algorithms = config.algorithms.clone();
        let mut validation = Validation::new(algorithms.first().copied().unwrap_or_default());
        validation.algorithms = algorithms.clone();
        validation.set_audience(&[&config.audience]);
        validation.set_issuer(&[&config.issuer]);
        validation.leeway = config.leeway_secs;

        Self {
            keys,
            algorithms,
            validation,
        }
    }

    /// Create a gatekeeper that fetches keys from the configured JWKS URI
    pub fn from_config(config: &GatekeeperConfig) -> Result<Self, ApiError> {
        let source = HttpKeySource::new(config.jwks_uri(), config.jwks_timeout())
            .map_err(|e| ApiError::Internal {
                message: e.to_string(),
            })?;
        let options = JwksCacheOptions::from_config(config)?;
        let keys = Arc::new(JwksCache::new(Arc::new(source), options));
        Ok(Self::new(config, keys))
    }

    pub fn keys(&self) -> &Arc<JwksCache> {
        &self.keys
    }

    /// Verify a token and return its claims
    #[instrument(level = "debug", skip_all)]
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::Malformed(e.to_string()))?;

        // Refuse before touching the key set so junk tokens cannot trigger fetches.
        if !self.algorithms.contains(&header.alg) {
            return Err(AuthError::DisallowedAlgorithm(header.alg));
        }

        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        debug!("JWT key ID: {}", kid);

        let key = self.keys.get_key(&kid).await?;
        if let Some(expected) = key.alg {
            if expected != header.alg {
                return Err(AuthError::KeyAlgorithmMismatch {
                    kid,
                    expected,
                    actual: header.alg,
                });
            }
        }

        let token_data = decode::<Claims>(token, key.decoding_key(), &self.validation)?;

        debug!(
            "JWT validation successful for subject: {}",
            token_data.claims.sub.as_deref().unwrap_or("<none>")
        );
        Ok(token_data.claims)
    }
}
