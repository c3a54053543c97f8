//! Local signup

use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info, instrument};

use crate::{
    error::{ApiError, Result},
    models::{CredentialPair, SignupResponse},
    server::AppState,
    services::SignupError,
};

/// Register a local username and password
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = CredentialPair,
    responses(
        (status = 201, description = "User registered", body = SignupResponse),
        (status = 400, description = "Username or password missing", body = crate::error::ErrorResponse),
        (status = 409, description = "Username is taken", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all, fields(username = %credentials.username))]
pub async fn signup(
    State(state): State<AppState>,
    Json(credentials): Json<CredentialPair>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    credentials
        .validate()
        .map_err(|message| ApiError::InvalidRequest { message })?;

    // The route is mounted only when a signup service exists.
    debug_assert!(state.signup.is_some(), "signup route mounted without a service");
    let service = state.signup.as_ref().ok_or_else(|| ApiError::Internal {
        message: "Signup is not enabled".to_string(),
    })?;

    if let Err(e) = service.register(&credentials).await {
        if !matches!(e, SignupError::UsernameTaken) {
            error!("Signup failed: {}", e);
        }
        return Err(e.into());
    }

    info!("Sign-up successful");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            username: credentials.username,
            message: "Sign-up successful".to_string(),
        }),
    ))
}
