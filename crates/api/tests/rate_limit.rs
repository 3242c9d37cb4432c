//! Rate limiting through the full middleware stack.

mod common;

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{body_json, unreachable_pool};
use tower::ServiceExt;

/// Send a GET as if it arrived from socket peer `peer`, optionally carrying
/// an `X-Forwarded-For` header.
async fn get_from(
    app: &Router,
    uri: &str,
    peer: [u8; 4],
    forwarded_for: Option<&str>,
) -> axum::response::Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = forwarded_for {
        builder = builder.header("x-forwarded-for", value);
    }
    let mut request = builder.body(Body::empty()).unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 51000))));
    app.clone().oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Test: the auth group allows ten requests per client, then answers 429
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auth_routes_limit_each_client() {
    let app = common::build_test_app(unreachable_pool());

    for _ in 0..10 {
        let response = get_from(&app, "/api/auth/me", [203, 0, 113, 9], None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = get_from(&app, "/api/auth/me", [203, 0, 113, 9], None).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .expect("429 must carry Retry-After")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);
    let json = body_json(response).await;
    assert_eq!(json["error"], "RATE_LIMITED");

    // A different peer is unaffected.
    let response = get_from(&app, "/api/auth/me", [198, 51, 100, 4], None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: rotating X-Forwarded-For does not reset the budget by default
// ---------------------------------------------------------------------------

#[tokio::test]
async fn spoofed_forwarded_for_shares_the_peer_budget() {
    let app = common::build_test_app(unreachable_pool());

    let mut limited = 0;
    for i in 0..20 {
        let spoofed = format!("10.9.8.{i}");
        let response = get_from(&app, "/api/auth/me", [192, 0, 2, 50], Some(&spoofed)).await;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        }
    }

    assert_eq!(limited, 10);
}

// ---------------------------------------------------------------------------
// Test: behind a trusted proxy only the right-most hop keys the client
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trusted_proxy_keys_on_right_most_hop() {
    let config = common::test_config_with(&[("TRUST_PROXY_HEADERS", "true")]);
    let app = common::build_test_app_with(unreachable_pool(), config);
    let proxy = [10, 0, 0, 2];

    for i in 0..10 {
        let chain = format!("172.16.0.{i}, 203.0.113.20");
        let response = get_from(&app, "/api/auth/me", proxy, Some(&chain)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let response = get_from(&app, "/api/auth/me", proxy, Some("8.8.8.8, 203.0.113.20")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another real client behind the same proxy keeps its own budget.
    let response = get_from(&app, "/api/auth/me", proxy, Some("203.0.113.21")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: exhausting the auth budget leaves other groups open
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auth_limit_does_not_leak_into_search() {
    let app = common::build_test_app(unreachable_pool());

    for _ in 0..11 {
        get_from(&app, "/api/auth/me", [192, 0, 2, 77], None).await;
    }

    let response = get_from(&app, "/api/search/suggestions?q=x", [192, 0, 2, 77], None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: the health check sits outside every limit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_not_rate_limited() {
    let app = common::build_test_app(unreachable_pool());

    for _ in 0..11 {
        get_from(&app, "/api/auth/me", [192, 0, 2, 8], None).await;
    }

    let response = get_from(&app, "/health", [192, 0, 2, 8], None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
