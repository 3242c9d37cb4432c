//! Authentication failures that are decided before any database access.
//!
//! The app runs against an unreachable pool, so every assertion here holds
//! without Postgres.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, send, sign_token, unreachable_pool, TEST_SECRET};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: protected routes reject a missing token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_returns_401() {
    let protected = [
        (Method::GET, "/api/auth/me"),
        (Method::POST, "/api/auth/verify"),
        (Method::GET, "/api/notifications"),
        (Method::GET, "/api/messages/conversations"),
        (Method::GET, "/api/analytics/platform"),
        (Method::GET, "/api/saved-professionals"),
        (Method::GET, "/api/search/suggested"),
    ];

    for (method, uri) in protected {
        let app = common::build_test_app(unreachable_pool());
        let response = send(app, method.clone(), uri, None, None).await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri} should require a token"
        );
        let json = body_json(response).await;
        assert_eq!(json["error"], "UNAUTHORIZED");
        assert_eq!(json["message"], "Missing Authorization header");
    }
}

// ---------------------------------------------------------------------------
// Test: a non-Bearer Authorization header is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_bearer_scheme_returns_401() {
    let app = common::build_test_app(unreachable_pool());
    let request = axum::http::Request::builder()
        .uri("/api/auth/me")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("Expected: Bearer <token>"));
}

// ---------------------------------------------------------------------------
// Test: a token signed with another secret is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forged_token_returns_401() {
    let forged = encode(
        &Header::default(),
        &json!({"sub": "uid-mallory", "exp": chrono::Utc::now().timestamp() + 3600}),
        &EncodingKey::from_secret(b"not-the-server-secret-at-all-nope"),
    )
    .unwrap();

    let app = common::build_test_app(unreachable_pool());
    let response = send(app, Method::GET, "/api/auth/me", Some(&forged), None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid or expired token");
}

// ---------------------------------------------------------------------------
// Test: an expired token gets its own message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expired_token_returns_401() {
    let expired = encode(
        &Header::default(),
        &json!({"sub": "uid-late", "exp": chrono::Utc::now().timestamp() - 3600}),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let app = common::build_test_app(unreachable_pool());
    let response = send(app, Method::GET, "/api/auth/me", Some(&expired), None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Token has expired");
}

// ---------------------------------------------------------------------------
// Test: ADMIN cannot be self-assigned at registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_rejects_admin_role() {
    let token = sign_token("uid-eve", "eve@example.com", true);
    let app = common::build_test_app(unreachable_pool());

    let response = send(
        app,
        Method::POST,
        "/api/auth/register",
        Some(&token),
        Some(json!({"role": "ADMIN"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Test: listing your own events requires a token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mine_filter_requires_token() {
    let app = common::build_test_app(unreachable_pool());
    let response = send(app, Method::GET, "/api/events?mine=true", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: short suggestion queries answer without a lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn short_suggestion_query_returns_empty() {
    let app = common::build_test_app(unreachable_pool());
    let response = send(app, Method::GET, "/api/search/suggestions?q=a", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], json!([]));
}
