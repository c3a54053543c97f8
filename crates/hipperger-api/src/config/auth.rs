//! Authentication configuration

use hipperger_common::{
    ConfigurationError, AUTH0_AUDIENCE, AUTH0_CONNECTION, AUTH0_DOMAIN, AUTH0_ISSUER,
};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// OAuth grant sent to the Auth0 token endpoint on login.
///
/// The deployed service has always sent `client_credentials` alongside the
/// user's username and password, so that remains the default. Tenants that
/// authenticate the user themselves should pick `password` or
/// `password_realm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GrantType {
    #[default]
    #[serde(rename = "client_credentials")]
    ClientCredentials,
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "http://auth0.com/oauth/grant-type/password-realm")]
    PasswordRealm,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::ClientCredentials => "client_credentials",
            GrantType::Password => "password",
            GrantType::PasswordRealm => "http://auth0.com/oauth/grant-type/password-realm",
        }
    }
}

/// Auth0 tenant settings used by the login forwarder
#[derive(Clone, Serialize, Deserialize)]
pub struct Auth0Config {
    /// Tenant domain (`AUTH0_DOMAIN`). A value with a scheme is used as the
    /// base URL verbatim.
    pub domain: String,

    /// API identifier requested for issued tokens (`AUTH0_IDENTITY`)
    pub audience: String,

    /// Application client ID (`AUTH0_CLIENT_ID`)
    pub client_id: String,

    /// Application client secret (`AUTH0_CLIENT_SECRET`)
    pub client_secret: String,

    /// Grant type sent on login
    pub grant_type: GrantType,

    /// Database connection the credentials belong to
    pub connection: String,

    /// Timeout for the whole token request, in seconds
    pub request_timeout_secs: u64,

    /// Connect timeout for the token request, in seconds
    pub connect_timeout_secs: u64,
}

impl Default for Auth0Config {
    fn default() -> Self {
        Self {
            domain: AUTH0_DOMAIN.to_string(),
            audience: AUTH0_AUDIENCE.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            grant_type: GrantType::default(),
            connection: AUTH0_CONNECTION.to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for Auth0Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth0Config")
            .field("domain", &self.domain)
            .field("audience", &self.audience)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("grant_type", &self.grant_type)
            .field("connection", &self.connection)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Auth0Config {
    /// Full URL of the OAuth token endpoint
    pub fn token_endpoint(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.contains("://") {
            format!("{domain}/oauth/token")
        } else {
            format!("https://{domain}/oauth/token")
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.domain.trim().is_empty() {
            return Err(ConfigurationError::missing("auth0.domain"));
        }
        if self.client_id.trim().is_empty() {
            return Err(ConfigurationError::missing("auth0.client_id"));
        }
        if self.client_secret.is_empty() {
            return Err(ConfigurationError::missing("auth0.client_secret"));
        }
        url::Url::parse(&self.token_endpoint())
            .map_err(|e| ConfigurationError::invalid("auth0.domain", e.to_string()))?;
        Ok(())
    }
}

/// Token gatekeeper settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    /// Expected `iss` claim
    pub issuer: String,

    /// Expected `aud` claim
    pub audience: String,

    /// Accepted signing algorithms
    pub algorithms: Vec<Algorithm>,

    /// Key set location; derived from the issuer when unset
    pub jwks_uri: Option<String>,

    /// Clock skew tolerated on `exp`/`nbf`, in seconds
    pub leeway_secs: u64,

    /// Cache resolved signing keys
    pub jwks_cache: bool,

    /// How long a cached key stays valid, in seconds
    pub jwks_cache_ttl_secs: u64,

    /// Maximum number of cached keys
    pub jwks_cache_max_entries: u64,

    /// Cap key set fetches
    pub jwks_rate_limit: bool,

    /// Key set fetches allowed per minute
    pub jwks_requests_per_minute: u32,

    /// Timeout of a key set fetch, in seconds
    pub jwks_timeout_secs: u64,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            issuer: AUTH0_ISSUER.to_string(),
            audience: AUTH0_AUDIENCE.to_string(),
            algorithms: vec![Algorithm::RS256],
            jwks_uri: None,
            leeway_secs: 0,
            jwks_cache: true,
            jwks_cache_ttl_secs: 600,
            jwks_cache_max_entries: 5,
            jwks_rate_limit: true,
            jwks_requests_per_minute: 5,
            jwks_timeout_secs: 30,
        }
    }
}

impl GatekeeperConfig {
    /// Key set URL, `<issuer>/.well-known/jwks.json` unless overridden
    pub fn jwks_uri(&self) -> String {
        match &self.jwks_uri {
            Some(uri) => uri.clone(),
            None => format!(
                "{}/.well-known/jwks.json",
                self.issuer.trim_end_matches('/')
            ),
        }
    }

    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    pub fn jwks_timeout(&self) -> Duration {
        Duration::from_secs(self.jwks_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.issuer.is_empty() {
            return Err(ConfigurationError::missing("gatekeeper.issuer"));
        }
        if self.audience.is_empty() {
            return Err(ConfigurationError::missing("gatekeeper.audience"));
        }
        if self.algorithms.is_empty() {
            return Err(ConfigurationError::missing("gatekeeper.algorithms"));
        }
        // Keys come from a public JWKS, so only asymmetric RSA algorithms make sense.
        if let Some(alg) = self.algorithms.iter().find(|alg| !is_rsa(**alg)) {
            return Err(ConfigurationError::invalid(
                "gatekeeper.algorithms",
                format!("{alg:?} is not an RSA signature algorithm"),
            ));
        }
        if self.jwks_rate_limit && self.jwks_requests_per_minute == 0 {
            return Err(ConfigurationError::invalid(
                "gatekeeper.jwks_requests_per_minute",
                "must be greater than zero when rate limiting is enabled",
            ));
        }
        url::Url::parse(&self.jwks_uri())
            .map_err(|e| ConfigurationError::invalid("gatekeeper.jwks_uri", e.to_string()))?;
        Ok(())
    }
}

fn is_rsa(alg: Algorithm) -> bool {
    matches!(
        alg,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
    )
}
