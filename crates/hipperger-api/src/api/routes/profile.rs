//! Caller identity

use axum::Json;

use crate::{api::middleware::AuthContext, models::ProfileResponse};

/// Identity carried by the caller's access token
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Authenticated caller", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 503, description = "Signing keys unavailable", body = crate::error::ErrorResponse)
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(auth: AuthContext) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user_id: auth.user_id,
        scopes: auth.scopes,
    })
}
