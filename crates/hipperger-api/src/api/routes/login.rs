//! Login forwarding

use axum::{extract::State, Json};
use tracing::{error, info, instrument};

use crate::{
    error::{ApiError, Result},
    models::{CredentialPair, LoginResponse},
    server::AppState,
};

/// Exchange a username and password for an Auth0 access token
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = CredentialPair,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Username or password missing", body = crate::error::ErrorResponse),
        (status = 401, description = "Rejected by the identity provider; body relayed as sent"),
        (status = 403, description = "Rejected by the identity provider; body relayed as sent"),
        (status = 502, description = "Identity provider unreachable", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all, fields(username = %credentials.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<CredentialPair>,
) -> Result<Json<LoginResponse>> {
    credentials
        .validate()
        .map_err(|message| ApiError::InvalidRequest { message })?;

    let access_token = state
        .identity_provider
        .exchange_credentials(&credentials)
        .await
        .map_err(|e| {
            error!("Login failed: {:?}", e);
            ApiError::from(e)
        })?;

    info!("Login succeeded");
    Ok(Json(LoginResponse { access_token }))
}
