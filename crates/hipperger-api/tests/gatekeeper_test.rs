//! Bearer token checks on protected routes

mod common;

use axum::http::{header, Method, Request, StatusCode};
use common::*;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    let (status, body) = me(TestApp::new().router(), Some(&valid_token())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "auth0|alice");
    assert_eq!(body["scopes"], json!(["read:profile", "write:profile"]));
}

#[tokio::test]
async fn test_token_without_subject_reaches_handler() {
    let mut claims = valid_claims();
    claims.as_object_mut().unwrap().remove("sub");
    let token = mint_token(&claims, SIGNING_KID, SIGNING_KEY_PEM);

    let (status, body) = me(TestApp::new().router(), Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "");
}

#[tokio::test]
async fn test_missing_authorization_rejected() {
    let keys = Arc::new(FakeKeySource::new(signing_jwks()));
    let app = TestApp::new().keys(keys.clone()).router();

    let (status, body) = me(app, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "HIPPERGER_API_AUTH_MISSING");
    assert_eq!(keys.calls(), 0);
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/me")
        .header(header::AUTHORIZATION, format!("Basic {}", valid_token()))
        .body(axum::body::Body::empty())
        .unwrap();

    let response = TestApp::new().router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_scheme_is_case_insensitive() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/me")
        .header(header::AUTHORIZATION, format!("bearer {}", valid_token()))
        .body(axum::body::Body::empty())
        .unwrap();

    let response = TestApp::new().router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrongly_signed_token_rejected() {
    let token = mint_token(&valid_claims(), SIGNING_KID, FOREIGN_KEY_PEM);

    let (status, body) = me(TestApp::new().router(), Some(&token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "HIPPERGER_API_AUTH_ERROR");
    assert_eq!(body["error"]["retryable"], false);
}

#[tokio::test]
async fn test_wrong_audience_rejected() {
    let mut claims = valid_claims();
    claims["aud"] = json!("some-other-api");
    let token = mint_token(&claims, SIGNING_KID, SIGNING_KEY_PEM);

    let (status, _) = me(TestApp::new().router(), Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_audience_array_containing_api_accepted() {
    let mut claims = valid_claims();
    claims["aud"] = json!([AUDIENCE, "https://hipperger.us.auth0.com/userinfo"]);
    let token = mint_token(&claims, SIGNING_KID, SIGNING_KEY_PEM);

    let (status, _) = me(TestApp::new().router(), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_issuer_rejected() {
    let mut claims = valid_claims();
    claims["iss"] = json!("https://attacker.example.com/");
    let token = mint_token(&claims, SIGNING_KID, SIGNING_KEY_PEM);

    let (status, _) = me(TestApp::new().router(), Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let mut claims = valid_claims();
    claims["iat"] = json!(now() - 7200);
    claims["exp"] = json!(now() - 600);
    let token = mint_token(&claims, SIGNING_KID, SIGNING_KEY_PEM);

    let (status, _) = me(TestApp::new().router(), Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_hs256_token_rejected_without_fetch() {
    let keys = Arc::new(FakeKeySource::new(signing_jwks()));
    let app = TestApp::new().keys(keys.clone()).router();

    let header = Header {
        kid: Some(SIGNING_KID.to_string()),
        ..Header::new(Algorithm::HS256)
    };
    let token = jsonwebtoken::encode(
        &header,
        &valid_claims(),
        &EncodingKey::from_secret(b"public-key-material"),
    )
    .unwrap();

    let (status, _) = me(app, Some(&token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(keys.calls(), 0);
}

#[tokio::test]
async fn test_unknown_key_id_rejected() {
    let token = mint_token(&valid_claims(), "rotated-away", SIGNING_KEY_PEM);

    let (status, body) = me(TestApp::new().router(), Some(&token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "HIPPERGER_API_AUTH_ERROR");
}

#[tokio::test]
async fn test_unreachable_key_set_is_service_unavailable() {
    let app = TestApp::new()
        .keys(Arc::new(FakeKeySource::failing()))
        .router();

    let (status, body) = me(app, Some(&valid_token())).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "HIPPERGER_API_SERVICE_UNAVAILABLE");
    assert_eq!(body["error"]["retryable"], true);
}

#[tokio::test]
async fn test_public_routes_need_no_token() {
    let (status, body) = send(TestApp::new().router(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(
        TestApp::new().router(),
        Method::GET,
        "/api-docs/openapi.json",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/login"].is_object());
}
