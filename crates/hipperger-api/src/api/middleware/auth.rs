//! Bearer token authentication for protected routes

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::{self, Next},
    response::Response,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    api::auth::{Claims, TokenGatekeeper},
    error::ApiError,
};

/// Identity of the caller, available to handlers behind [`auth_middleware`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Token subject, empty when the token carries none
    pub user_id: String,

    /// Scopes granted to the token
    pub scopes: Vec<String>,
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone().unwrap_or_default(),
            scopes: claims.scopes(),
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::MissingAuthentication {
                message: "No authenticated caller on this route".to_string(),
            })
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Reject requests without a valid bearer token before they reach the handler
pub async fn auth_middleware(
    State(gatekeeper): State<Arc<TokenGatekeeper>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(req.headers()).ok_or_else(|| {
        ApiError::MissingAuthentication {
            message: "Missing or malformed Authorization header".to_string(),
        }
    })?;

    let claims = match gatekeeper.validate(token).await {
        Ok(claims) => claims,
        Err(e) if e.is_unavailable() => {
            warn!("Unable to verify token: {}", e);
            return Err(ApiError::ServiceUnavailable {
                message: "Unable to verify token - signing keys unavailable".to_string(),
            });
        }
        Err(e) => {
            warn!("JWT validation failed: {}", e);
            return Err(ApiError::Authentication {
                message: "Invalid token".to_string(),
            });
        }
    };

    debug!(
        "JWT authentication successful for user: {:?}. Scopes: {:?}",
        claims.sub, claims.scope
    );

    req.extensions_mut().insert(AuthContext::from(&claims));
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Guard every route of `router` with [`auth_middleware`]
pub fn protect<S>(router: Router<S>, gatekeeper: Arc<TokenGatekeeper>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(gatekeeper, auth_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer_token(&headers("bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer ")), None);
        assert_eq!(extract_bearer_token(&headers("abc.def")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
