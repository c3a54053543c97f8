//! Signing key resolution backed by a published JSON Web Key Set
//!
//! [`JwksCache`] resolves a key ID to a decoding key. Keys come from a
//! [`KeySource`] (the provider's `/.well-known/jwks.json` in production),
//! are cached per key ID, and fetches of the whole set are capped by a
//! per-minute rate limiter so a flood of unknown key IDs cannot hammer the
//! identity provider.

use async_trait::async_trait;
use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use hipperger_common::ConfigurationError;
use jsonwebtoken::{Algorithm, DecodingKey};
use moka::future::Cache;
use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::GatekeeperConfig;

/// JSON Web Key Set structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// JSON Web Key structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: Option<String>,
    pub alg: Option<String>,
    pub r#use: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

/// Failure to obtain the key set from its source
#[derive(Debug, Clone, Error)]
pub enum KeySourceError {
    #[error("Failed to fetch JWKS: {0}")]
    Fetch(String),

    #[error("JWKS endpoint returned status {0}")]
    Status(u16),

    #[error("Failed to parse JWKS: {0}")]
    Parse(String),
}

/// Failure to resolve a signing key
#[derive(Debug, Clone, Error)]
pub enum KeyLookupError {
    #[error(transparent)]
    Source(#[from] KeySourceError),

    #[error("JWKS fetch rate limit reached")]
    RateLimited,

    #[error("JWKS contains no usable signing keys")]
    NoUsableKeys,

    #[error("No signing key found for key ID: {0}")]
    NotFound(String),
}

impl KeyLookupError {
    /// True when the key set could not be consulted at all
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, KeyLookupError::NotFound(_))
    }
}

/// Where key sets come from
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, KeySourceError>;
}

/// Fetches the key set over HTTPS
pub struct HttpKeySource {
    client: reqwest::Client,
    jwks_uri: String,
}

impl HttpKeySource {
    pub fn new(jwks_uri: impl Into<String>, timeout: Duration) -> Result<Self, KeySourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| KeySourceError::Fetch(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            jwks_uri: jwks_uri.into(),
        })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    #[instrument(level = "debug", skip(self), fields(uri = %self.jwks_uri))]
    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        let response = self
            .client
            .get(&self.jwks_uri)
            .header(
                reqwest::header::USER_AGENT,
                concat!("hipperger-api/", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .await
            .map_err(|e| KeySourceError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KeySourceError::Status(response.status().as_u16()));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| KeySourceError::Parse(e.to_string()))?;

        debug!("Fetched JWKS with {} keys", jwks.keys.len());
        Ok(jwks)
    }
}

/// A verified-usable signing key
pub struct SigningKey {
    pub kid: String,
    /// Algorithm the key is bound to, when the JWK declares one
    pub alg: Option<Algorithm>,
    key: DecodingKey,
}

impl SigningKey {
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }

    /// Convert a JWK into a signing key, `None` if it cannot verify RSA signatures
    pub fn from_jwk(jwk: &Jwk) -> Option<Self> {
        if jwk.kty != "RSA" || jwk.r#use.as_deref() == Some("enc") {
            return None;
        }
        let kid = jwk.kid.clone()?;
        let (n, e) = (jwk.n.as_deref()?, jwk.e.as_deref()?);
        let key = match DecodingKey::from_rsa_components(n, e) {
            Ok(key) => key,
            Err(e) => {
                warn!(kid = %kid, error = %e, "Skipping JWK with invalid RSA components");
                return None;
            }
        };
        let alg = jwk.alg.as_deref().and_then(|a| Algorithm::from_str(a).ok());

        Some(Self { kid, alg, key })
    }
}

/// Caching and rate limiting knobs of [`JwksCache`]
#[derive(Debug, Clone)]
pub struct JwksCacheOptions {
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_max_entries: u64,
    /// Key set fetches allowed in any 60 s window; `None` disables the limit
    pub requests_per_minute: Option<NonZeroU32>,
}

impl Default for JwksCacheOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl: Duration::from_secs(600),
            cache_max_entries: 5,
            requests_per_minute: Some(nonzero!(5u32)),
        }
    }
}

impl JwksCacheOptions {
    pub fn from_config(config: &GatekeeperConfig) -> Result<Self, ConfigurationError> {
        let requests_per_minute = if config.jwks_rate_limit {
            Some(
                NonZeroU32::new(config.jwks_requests_per_minute).ok_or_else(|| {
                    ConfigurationError::invalid(
                        "gatekeeper.jwks_requests_per_minute",
                        "must be greater than zero",
                    )
                })?,
            )
        } else {
            None
        };

        Ok(Self {
            cache_enabled: config.jwks_cache,
            cache_ttl: config.jwks_cache_ttl(),
            cache_max_entries: config.jwks_cache_max_entries,
            requests_per_minute,
        })
    }
}

type FetchLimiter<C> =
    RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Quota admitting at most `max` fetches in any 60 s window.
///
/// The whole allowance is available as a burst, but spent permits come back
/// one per minute. `Quota::per_minute(max)` would refill every `60 / max`
/// seconds and let `2 * max - 1` fetches through in a single minute.
fn fetch_quota(max: NonZeroU32) -> Quota {
    Quota::per_minute(nonzero!(1u32)).allow_burst(max)
}

/// Key ID → signing key cache in front of a [`KeySource`]
pub struct JwksCache<C: Clock = DefaultClock> {
    source: Arc<dyn KeySource>,
    keys: Option<Cache<String, Arc<SigningKey>>>,
    limiter: Option<FetchLimiter<C>>,
    fetches: AtomicU64,
}

impl JwksCache {
    pub fn new(source: Arc<dyn KeySource>, options: JwksCacheOptions) -> Self {
        Self::with_clock(source, options, &DefaultClock::default())
    }
}

impl<C: Clock> JwksCache<C> {
    /// Build a cache whose fetch limiter reads time from `clock`
    pub fn with_clock(source: Arc<dyn KeySource>, options: JwksCacheOptions, clock: &C) -> Self {
        let keys = options.cache_enabled.then(|| {
            Cache::builder()
                .time_to_live(options.cache_ttl)
                .max_capacity(options.cache_max_entries)
                .build()
        });
        let limiter = options
            .requests_per_minute
            .map(|max| RateLimiter::direct_with_clock(fetch_quota(max), clock));

        Self {
            source,
            keys,
            limiter,
            fetches: AtomicU64::new(0),
        }
    }

    /// Resolve a key ID, fetching the key set on a cache miss.
    ///
    /// Concurrent misses for the same key ID share a single fetch.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_key(&self, kid: &str) -> Result<Arc<SigningKey>, KeyLookupError> {
        match &self.keys {
            Some(cache) => cache
                .try_get_with(kid.to_string(), self.load(kid))
                .await
                .map_err(|e| (*e).clone()),
            None => self.load(kid).await,
        }
    }

    async fn load(&self, kid: &str) -> Result<Arc<SigningKey>, KeyLookupError> {
        if let Some(limiter) = &self.limiter {
            if limiter.check().is_err() {
                warn!(kid = %kid, "JWKS fetch rate limit reached");
                return Err(KeyLookupError::RateLimited);
            }
        }

        self.fetches.fetch_add(1, Ordering::Relaxed);
        let jwks = self.source.fetch().await?;

        let keys: Vec<Arc<SigningKey>> = jwks
            .keys
            .iter()
            .filter_map(SigningKey::from_jwk)
            .map(Arc::new)
            .collect();
        if keys.is_empty() {
            return Err(KeyLookupError::NoUsableKeys);
        }

        let mut found = None;
        for key in keys {
            if key.kid == kid {
                found = Some(key);
            } else if let Some(cache) = &self.keys {
                cache.insert(key.kid.clone(), key).await;
            }
        }

        found.ok_or_else(|| {
            debug!(kid = %kid, "Key ID not present in fetched JWKS");
            KeyLookupError::NotFound(kid.to_string())
        })
    }

    /// Drop every cached key, forcing the next lookup to fetch
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.keys {
            cache.invalidate_all();
        }
        debug!("JWKS cache cleared");
    }

    /// Number of cached keys; approximate until pending maintenance runs
    pub async fn entry_count(&self) -> u64 {
        match &self.keys {
            Some(cache) => {
                cache.run_pending_tasks().await;
                cache.entry_count()
            }
            None => 0,
        }
    }

    /// Key set fetches performed so far
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}
