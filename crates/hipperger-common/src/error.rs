//! Error types shared across crates

use thiserror::Error;

/// Marker trait for error types owned by hipperger crates
pub trait HippergerError: std::error::Error + Send + Sync + 'static {}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The configuration sources could not be parsed or merged
    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },

    /// A required value is absent
    #[error("Missing required configuration value: {key}")]
    MissingValue { key: String },

    /// A value is present but unusable
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl HippergerError for ConfigurationError {}

impl ConfigurationError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingValue { key: key.into() }
    }

    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigurationError::missing("auth0.domain").to_string(),
            "Missing required configuration value: auth0.domain"
        );
        assert_eq!(
            ConfigurationError::invalid("gatekeeper.jwks_requests_per_minute", "must be > 0")
                .to_string(),
            "Invalid configuration value for gatekeeper.jwks_requests_per_minute: must be > 0"
        );
    }
}
