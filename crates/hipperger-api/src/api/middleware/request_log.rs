//! Per-request access log line

use axum::{extract::Request, middleware::Next, response::Response};
use chrono::{SecondsFormat, Utc};
use tracing::info;

/// Log the method and path of every inbound request as it arrives
pub async fn request_logger(req: Request, next: Next) -> Response {
    info!(
        method = %req.method(),
        path = %req.uri().path(),
        received_at = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "Incoming request"
    );
    next.run(req).await
}
