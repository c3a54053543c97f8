//! Services behind the HTTP handlers

pub mod auth0;
pub mod credentials;

pub use auth0::{Auth0Client, IdentityProvider, ProviderError};
pub use credentials::{
    CredentialStore, InMemoryCredentialStore, PgCredentialStore, SignupError, SignupService,
    StoreError,
};
