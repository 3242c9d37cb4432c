//! Tests for `AppError` to HTTP response mapping.
//!
//! Each variant is converted with `into_response` and the status code plus
//! the `{ success, message, error }` envelope are checked.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use collabbridge_api::error::AppError;
use collabbridge_core::error::CoreError;
use http_body_util::BodyExt;
use serde_json::Value;

async fn into_parts(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ---------------------------------------------------------------------------
// Test: NotFound maps to 404 with entity and id in the message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_maps_to_404() {
    let (status, json) = into_parts(AppError::Core(CoreError::not_found("Event", 42))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "NOT_FOUND");
    assert_eq!(json["message"], "Event with id 42 not found");
}

// ---------------------------------------------------------------------------
// Test: Validation maps to 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_maps_to_400() {
    let (status, json) =
        into_parts(AppError::Core(CoreError::Validation("rating must be 1-5".into()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "rating must be 1-5");
}

// ---------------------------------------------------------------------------
// Test: Conflict, Unauthorized, Forbidden, RateLimited
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_errors_map_to_their_status_codes() {
    let cases = [
        (CoreError::Conflict("dup".into()), StatusCode::CONFLICT, "CONFLICT"),
        (
            CoreError::Unauthorized("no token".into()),
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
        ),
        (CoreError::Forbidden("nope".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
        (
            CoreError::RateLimited("slow down".into()),
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMITED",
        ),
    ];

    for (err, expected_status, expected_code) in cases {
        let (status, json) = into_parts(AppError::Core(err)).await;
        assert_eq!(status, expected_status);
        assert_eq!(json["error"], expected_code);
    }
}

// ---------------------------------------------------------------------------
// Test: internal errors never leak their text
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_message_is_sanitized() {
    let (status, json) =
        into_parts(AppError::InternalError("password=hunter2 in query".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "INTERNAL_ERROR");
    assert_eq!(json["message"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: RowNotFound maps to 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, json) = into_parts(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: other sqlx errors map to a sanitized 500
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pool_timeout_maps_to_500() {
    let (status, json) = into_parts(AppError::Database(sqlx::Error::PoolTimedOut)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: BadRequest and Unavailable
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_and_unavailable_map_correctly() {
    let (status, json) = into_parts(AppError::BadRequest("missing file field".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "BAD_REQUEST");

    let (status, json) =
        into_parts(AppError::Unavailable("File uploads are not configured".into())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "SERVICE_UNAVAILABLE");
    assert_eq!(json["message"], "File uploads are not configured");
}
