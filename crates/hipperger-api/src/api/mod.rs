//! API module for the hipperger auth gateway

pub mod auth;
pub mod middleware;
pub mod routes;

use crate::server::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

/// Routes mounted under `/api/v1`
pub fn routes(state: AppState) -> Router<AppState> {
    let protected = middleware::protect(
        Router::new().route("/me", get(routes::profile::me)),
        state.gatekeeper.clone(),
    );

    let mut router = Router::new()
        .route("/login", post(routes::login::login))
        .merge(protected);

    if state.signup.is_some() {
        router = router.route("/signup", post(routes::signup::signup));
    }

    router
}

/// Routes reachable without a token outside the versioned prefix
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::login::login,
        routes::signup::signup,
        routes::profile::me,
        routes::health::health_check,
    ),
    components(schemas(
        crate::models::CredentialPair,
        crate::models::LoginResponse,
        crate::models::SignupResponse,
        crate::models::ProfileResponse,
        routes::health::HealthCheckResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorDetails,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Login, signup and caller identity"),
        (name = "health", description = "Health and monitoring"),
    ),
    info(
        title = "Hipperger API",
        version = "0.1.0",
        description = "Auth0 login forwarding and JWT-guarded routes for the hipperger backend",
        license(
            name = "MIT",
        ),
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development"),
    ),
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
