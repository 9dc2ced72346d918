//! JSON pass-through and health endpoints.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use roster_integration_tests::{TestContext, body_text};
use wiremock::matchers::{body_json, header as header_is, method, path};
use wiremock::{Mock, ResponseTemplate};

fn check_email(email: &str) -> Request<Body> {
    Request::post("/api/auth/check-email")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "email": email }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_invalid_email_is_rejected_before_the_backend() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.backend)
        .await;

    let response = ctx.send(check_email("not-an-email")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_valid_email_is_checked_by_the_backend() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/check-email"))
        .and(body_json(serde_json::json!({"email": "ada@example.com"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"authorized": true})),
        )
        .mount(&ctx.backend)
        .await;

    let response = ctx.send(check_email("Ada@Example.com")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["authorized"], true);
}

#[tokio::test]
async fn test_auth_status_carries_identity_when_signed_in() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/auth/status"))
        .and(header_is("x-identity-id", "user_1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"authenticated": true})),
        )
        .mount(&ctx.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"authenticated": false})),
        )
        .mount(&ctx.backend)
        .await;

    let signed_in = body_text(ctx.get_signed_in("/api/auth/status").await).await;
    assert!(signed_in.contains("\"authenticated\":true"));

    let anonymous = body_text(ctx.get("/api/auth/status").await).await;
    assert!(anonymous.contains("\"authenticated\":false"));
}

#[tokio::test]
async fn test_backend_outage_is_a_bad_gateway() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&ctx.backend)
        .await;

    let response = ctx.get("/api/auth/me").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_readiness_follows_backend() {
    let ctx = TestContext::new().await;
    assert_eq!(
        ctx.get("/health/ready").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&ctx.backend)
        .await;
    assert_eq!(ctx.get("/health/ready").await.status(), StatusCode::OK);
}
