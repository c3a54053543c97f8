//! Local credential storage for signup
//!
//! Passwords are hashed with Argon2id before they reach a [`CredentialStore`].
//! Hashing runs on the blocking pool so it does not stall request handling.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SignupConfig;
use crate::models::CredentialPair;

/// Storage-level failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    Duplicate,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of a failed signup
#[derive(Debug, Error)]
pub enum SignupError {
    #[error("Username is taken")]
    UsernameTaken,

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Credential storage failed: {0}")]
    Storage(String),
}

impl From<StoreError> for SignupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => SignupError::UsernameTaken,
            StoreError::Database(e) => SignupError::Storage(e.to_string()),
        }
    }
}

/// Persists `(username, password hash)` pairs
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new pair; an existing username yields [`StoreError::Duplicate`]
    async fn insert(&self, username: &str, password_hash: &str) -> Result<(), StoreError>;
}

/// Postgres-backed credential store
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the credentials table exists
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_credentials (
                username TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_credentials (username, password_hash)
            VALUES ($1, $2)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local credential store
#[derive(Default)]
pub struct InMemoryCredentialStore {
    entries: DashMap<String, String>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn stored_hash(&self, username: &str) -> Option<String> {
        self.entries.get(username).map(|hash| hash.value().clone())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        match self.entries.entry(username.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(password_hash.to_string());
                Ok(())
            }
        }
    }
}

/// Hash a password with Argon2id on the blocking pool
pub async fn hash_password(password: String) -> Result<String, SignupError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| SignupError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| SignupError::Hashing(e.to_string()))?
}

/// Registers local users
pub struct SignupService {
    store: Arc<dyn CredentialStore>,
}

impl SignupService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Build the service from configuration, picking Postgres when a URL is set
    pub async fn from_config(config: &SignupConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn CredentialStore> = match &config.database_url {
            Some(url) => {
                info!("Using Postgres credential store");
                Arc::new(PgCredentialStore::connect(url, config.max_connections).await?)
            }
            None => {
                warn!("No signup database configured, credentials are kept in memory");
                Arc::new(InMemoryCredentialStore::new())
            }
        };
        Ok(Self::new(store))
    }

    pub async fn register(&self, credentials: &CredentialPair) -> Result<(), SignupError> {
        let hash = hash_password(credentials.password.clone()).await?;
        self.store.insert(&credentials.username, &hash).await?;
        debug!("Registered user {}", credentials.username);
        Ok(())
    }
}
