//! Auth0 token endpoint client used by the login forwarder

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{Auth0Config, GrantType};
use crate::models::CredentialPair;

/// Errors from the identity provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status
    #[error("Identity provider rejected the request with status {status}")]
    Rejected { status: u16, body: Value },

    /// The provider could not be reached
    #[error("Identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered 2xx with something we cannot use
    #[error("Invalid identity provider response: {0}")]
    InvalidResponse(String),
}

/// Exchanges user credentials for an access token
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the access token exactly as issued
    async fn exchange_credentials(&self, credentials: &CredentialPair)
        -> Result<String, ProviderError>;
}

/// Body of the token request
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    username: &'a str,
    password: &'a str,
    audience: &'a str,
    connection: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    realm: Option<&'a str>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// [`IdentityProvider`] backed by the Auth0 `/oauth/token` endpoint
pub struct Auth0Client {
    client: Client,
    token_endpoint: String,
    config: Auth0Config,
}

impl Auth0Client {
    pub fn new(config: Auth0Config) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("hipperger-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            token_endpoint: config.token_endpoint(),
            config,
        })
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    fn token_request<'a>(&'a self, credentials: &'a CredentialPair) -> TokenRequest<'a> {
        let grant_type = self.config.grant_type;
        TokenRequest {
            grant_type: grant_type.as_str(),
            username: &credentials.username,
            password: &credentials.password,
            audience: &self.config.audience,
            connection: &self.config.connection,
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            realm: (grant_type == GrantType::PasswordRealm)
                .then_some(self.config.connection.as_str()),
        }
    }
}

#[async_trait]
impl IdentityProvider for Auth0Client {
    #[instrument(level = "debug", skip_all, fields(username = %credentials.username))]
    async fn exchange_credentials(
        &self,
        credentials: &CredentialPair,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.token_endpoint)
            .json(&self.token_request(credentials))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        debug!("Token exchange succeeded");
        token
            .access_token
            .ok_or_else(|| ProviderError::InvalidResponse("missing access_token".to_string()))
    }
}
