//! Error types for the hipperger API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hipperger_common::{ConfigurationError, HippergerError};
use serde_json::json;
use thiserror::Error;

use crate::services::auth0::ProviderError;
use crate::services::credentials::SignupError;

/// Main error type for the hipperger API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    /// Missing authentication (no token provided)
    #[error("Authentication required: {message}")]
    MissingAuthentication { message: String },

    /// Authentication error (expired/invalid token)
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Invalid request
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Resource already exists
    #[error("{message}")]
    Conflict { message: String },

    /// Identity provider call failed
    #[error(transparent)]
    Upstream(#[from] ProviderError),

    /// A dependency needed to answer is down
    #[error("Service temporarily unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// Internal server error
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

impl HippergerError for ApiError {}

impl From<SignupError> for ApiError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::UsernameTaken => ApiError::Conflict {
                message: "Username is taken".to_string(),
            },
            SignupError::Hashing(_) | SignupError::Storage(_) => ApiError::Internal {
                message: "Signup failed".to_string(),
            },
        }
    }
}

impl ApiError {
    /// Get error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Config(_) => "HIPPERGER_API_CONFIG_ERROR",
            ApiError::MissingAuthentication { .. } => "HIPPERGER_API_AUTH_MISSING",
            ApiError::Authentication { .. } => "HIPPERGER_API_AUTH_ERROR",
            ApiError::InvalidRequest { .. } => "HIPPERGER_API_INVALID_REQUEST",
            ApiError::Conflict { .. } => "HIPPERGER_API_CONFLICT",
            ApiError::Upstream(_) => "HIPPERGER_API_UPSTREAM_ERROR",
            ApiError::ServiceUnavailable { .. } => "HIPPERGER_API_SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } => "HIPPERGER_API_INTERNAL_ERROR",
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::ServiceUnavailable { .. }
                | ApiError::Upstream(ProviderError::Transport(_))
        )
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingAuthentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Provider rejections go back to the caller exactly as the provider sent them.
        if let ApiError::Upstream(ProviderError::Rejected { status, body }) = self {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            return (status, Json(body)).into_response();
        }

        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now(),
                "retryable": self.is_retryable(),
            }
        }));

        (status, body).into_response()
    }
}

/// Error response structure for API documentation
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetails,
}

/// Error details structure
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorDetails {
    /// Error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// ISO 8601 timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Whether the error is retryable
    pub retryable: bool,
}
