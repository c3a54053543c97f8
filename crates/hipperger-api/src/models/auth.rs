//! Authentication models

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Username and password submitted on login or signup.
///
/// Both fields default to empty so that a body missing one of them reaches
/// [`CredentialPair::validate`] instead of failing JSON extraction.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CredentialPair {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialPair {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reject pairs that cannot authenticate anyone
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username is required".to_string());
        }
        if self.password.is_empty() {
            return Err("password is required".to_string());
        }
        Ok(())
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct LoginResponse {
    /// Access token issued by the identity provider, relayed verbatim
    pub access_token: String,
}

/// Successful signup
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub username: String,
    pub message: String,
}

/// Identity attached to an authenticated request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    /// Token subject
    pub user_id: String,
    /// Granted scopes
    pub scopes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_both_fields() {
        assert!(CredentialPair::new("alice", "pw").validate().is_ok());
        assert_eq!(
            CredentialPair::new("  ", "pw").validate().unwrap_err(),
            "username is required"
        );
        assert_eq!(
            CredentialPair::new("alice", "").validate().unwrap_err(),
            "password is required"
        );
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let pair: CredentialPair = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        assert_eq!(pair.username, "alice");
        assert!(pair.password.is_empty());
        assert!(pair.validate().is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", CredentialPair::new("alice", "hunter2"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
