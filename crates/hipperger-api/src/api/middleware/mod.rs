//! API middleware stack

mod auth;
mod request_log;

pub use auth::{auth_middleware, extract_bearer_token, protect, AuthContext};
pub use request_log::request_logger;

use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Apply the shared middleware to a router
pub fn apply_middleware(router: Router, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
            .layer(axum::middleware::from_fn(request_logger))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(cors),
    )
}
