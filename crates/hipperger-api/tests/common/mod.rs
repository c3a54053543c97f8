//! Shared fixtures for hipperger-api integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use hipperger_api::{
    api::auth::{
        Jwk, JwkSet, JwksCache, JwksCacheOptions, KeySource, KeySourceError, TokenGatekeeper,
    },
    config::Config,
    models::CredentialPair,
    services::{IdentityProvider, InMemoryCredentialStore, ProviderError, SignupService},
    build_router, AppState,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

/// Private half of the key published in [`signing_jwks`]
pub const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");

/// A key the tenant never published
pub const FOREIGN_KEY_PEM: &str = include_str!("../fixtures/foreign_key.pem");

pub const SIGNING_KID: &str = "hipperger-test-key";

const SIGNING_KEY_N: &str = "ywAPGl7-BnYHhIKHtLdgriTcj-A08YfMmBWxGQY4oOljbiPzrHVD0qUGfhXROApabo3TVm-Z8ifam6ZRh7KeJzBuHHCH03JPaZuJRZ3eLhcOyRzgws4bMmKBVKscoNjWCzExL2aFYYyj5lpMIOKThjftPC8W3onGeuT3zieKx14p3fUxgT0CUW4VkDFjhLrCvR_WPqvTB4oo7svEbmoSpwS385Mai46rTl_8l-1eSq_fJ6EPtevTofKal9FJsgcSKuyAaH75DTXVJlxa1Bkmxm2YLjzTFVVBthWx7u14T64rHE0TDcZLjva5YMmrg7s74ZUI0Jo_OBnEO5ab3O282Q";

pub const ISSUER: &str = "https://hipperger.us.auth0.com/";
pub const AUDIENCE: &str = "my-express-app";

/// JWK for the public half of [`SIGNING_KEY_PEM`]
pub fn signing_jwk(kid: &str) -> Jwk {
    Jwk {
        kty: "RSA".to_string(),
        kid: Some(kid.to_string()),
        alg: Some("RS256".to_string()),
        r#use: Some("sig".to_string()),
        n: Some(SIGNING_KEY_N.to_string()),
        e: Some("AQAB".to_string()),
        other: HashMap::new(),
    }
}

pub fn signing_jwks() -> JwkSet {
    JwkSet {
        keys: vec![signing_jwk(SIGNING_KID)],
    }
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Claims the gatekeeper accepts by default
pub fn valid_claims() -> Value {
    json!({
        "sub": "auth0|alice",
        "aud": AUDIENCE,
        "iss": ISSUER,
        "iat": now(),
        "exp": now() + 3600,
        "scope": "read:profile write:profile",
    })
}

pub fn mint_token(claims: &Value, kid: &str, pem: &str) -> String {
    let header = Header {
        kid: Some(kid.to_string()),
        ..Header::new(Algorithm::RS256)
    };
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    jsonwebtoken::encode(&header, claims, &key).unwrap()
}

/// A correctly signed token with default claims
pub fn valid_token() -> String {
    mint_token(&valid_claims(), SIGNING_KID, SIGNING_KEY_PEM)
}

/// In-memory key source that counts fetches
pub struct FakeKeySource {
    jwks: Option<JwkSet>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeKeySource {
    pub fn new(jwks: JwkSet) -> Self {
        Self {
            jwks: Some(jwks),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// A source whose endpoint always answers 503
    pub fn failing() -> Self {
        Self {
            jwks: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySource for FakeKeySource {
    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.jwks.clone().ok_or(KeySourceError::Status(503))
    }
}

/// What the fake identity provider answers
#[derive(Clone)]
pub enum ProviderReply {
    Token(String),
    Reject { status: u16, body: Value },
}

/// Identity provider double that counts exchanges
pub struct FakeIdentityProvider {
    reply: ProviderReply,
    calls: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn new(reply: ProviderReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn exchange_credentials(
        &self,
        _credentials: &CredentialPair,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply.clone() {
            ProviderReply::Token(token) => Ok(token),
            ProviderReply::Reject { status, body } => {
                Err(ProviderError::Rejected { status, body })
            }
        }
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth0.client_id = "test-client".to_string();
    config.auth0.client_secret = "test-secret".to_string();
    config
}

/// Builder for an application state wired with test doubles
pub struct TestApp {
    pub config: Config,
    pub provider: Arc<dyn IdentityProvider>,
    pub keys: Arc<dyn KeySource>,
    pub cache_options: JwksCacheOptions,
    pub signup: bool,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            config: test_config(),
            provider: Arc::new(FakeIdentityProvider::new(ProviderReply::Token(
                "unused".to_string(),
            ))),
            keys: Arc::new(FakeKeySource::new(signing_jwks())),
            cache_options: JwksCacheOptions::default(),
            signup: false,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn keys(mut self, keys: Arc<dyn KeySource>) -> Self {
        self.keys = keys;
        self
    }

    pub fn cache_options(mut self, options: JwksCacheOptions) -> Self {
        self.cache_options = options;
        self
    }

    pub fn with_signup(mut self) -> Self {
        self.signup = true;
        self
    }

    pub fn router(self) -> Router {
        let cache = Arc::new(JwksCache::new(self.keys, self.cache_options));
        let gatekeeper = TokenGatekeeper::new(&self.config.gatekeeper, cache);
        let signup = self
            .signup
            .then(|| Arc::new(SignupService::new(Arc::new(InMemoryCredentialStore::new()))));

        build_router(AppState {
            config: Arc::new(self.config),
            identity_provider: self.provider,
            gatekeeper: Arc::new(gatekeeper),
            signup,
        })
    }
}

/// Send one request through the router and decode the JSON body
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

pub async fn login(app: Router, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, "/api/v1/login", None, Some(body)).await
}

pub async fn me(app: Router, bearer: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, "/api/v1/me", bearer, None).await
}
