//! Tests for `AppError` -> HTTP response mapping.
//!
//! These tests verify that each `AppError` variant produces the correct HTTP
//! status code, error code, and message. They do NOT need an HTTP server --
//! they call `IntoResponse` directly on `AppError` values.

use axum::response::IntoResponse;
use http_body_util::BodyExt;
use strider_api::error::AppError;
use strider_core::error::{CoreError, StateCode};
use strider_gateway::GatewayError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (axum::http::StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 400 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_400() {
    // Unknown challenges and orders are client mistakes on this API, so
    // the mapping is 400, not 404.
    let err = AppError::Core(CoreError::NotFound {
        entity: "Challenge",
        key: "42".to_string(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Challenge not found: 42");
}

// ---------------------------------------------------------------------------
// Test: CoreError::Validation maps to 400 with VALIDATION_ERROR code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("order_id is required".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "order_id is required");
}

// ---------------------------------------------------------------------------
// Test: CoreError::State maps to 400 and carries the state code verbatim
// ---------------------------------------------------------------------------

#[tokio::test]
async fn state_error_returns_400_with_its_code() {
    let err = AppError::Core(CoreError::state(
        StateCode::ChallengeActive,
        "complete the current challenge before starting a new one",
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CHALLENGE_ACTIVE");
    assert_eq!(
        json["error"],
        "complete the current challenge before starting a new one"
    );
}

#[tokio::test]
async fn every_state_code_renders_verbatim() {
    let cases = [
        (StateCode::ErrorStartDate, "ERROR_START_DATE"),
        (StateCode::ErrorEndDate, "ERROR_END_DATE"),
        (StateCode::GiftNotReached, "GIFT_NOT_REACHED"),
        (StateCode::GiftAlreadyOpened, "GIFT_ALREADY_OPENED"),
        (StateCode::GiftUnknownMilestone, "GIFT_UNKNOWN_MILESTONE"),
        (StateCode::NotSettleable, "NOT_SETTLEABLE"),
    ];

    for (code, expected) in cases {
        let err = AppError::Core(CoreError::state(code, "rejected"));
        let (status, json) = error_to_response(err).await;
        assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], expected);
    }
}

// ---------------------------------------------------------------------------
// Test: CoreError::Unauthorized maps to 401 with UNAUTHORIZED code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_error_returns_401() {
    let err = AppError::Core(CoreError::Unauthorized("no token provided".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "no token provided");
}

// ---------------------------------------------------------------------------
// Test: AppError::BadRequest maps to 400 with BAD_REQUEST code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

// ---------------------------------------------------------------------------
// Test: AppError::InternalError maps to 500 and sanitizes the message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");

    // The response body must NOT contain the original error details.
    let body_text = json.to_string();
    assert!(
        !body_text.contains("secret"),
        "Internal error response must not leak sensitive details"
    );
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: CoreError::Internal maps to 500 and sanitizes like InternalError
// ---------------------------------------------------------------------------

#[tokio::test]
async fn core_internal_error_returns_500_and_sanitizes() {
    let err = AppError::Core(CoreError::Internal("panic stack trace here".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");

    let body_text = json.to_string();
    assert!(
        !body_text.contains("panic stack trace"),
        "Core internal error must not leak details"
    );
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: declined payments map to 502 with GATEWAY_ERROR code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn declined_gateway_error_returns_502() {
    let err = AppError::Gateway(GatewayError::Declined {
        status: 9,
        message: "insufficient funds".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "GATEWAY_ERROR");
    assert_eq!(
        json["error"],
        "Payment declined by gateway (status 9): insufficient funds"
    );
}

#[tokio::test]
async fn gateway_http_error_returns_502() {
    let err = AppError::Gateway(GatewayError::HttpStatus {
        status: 503,
        body: "maintenance".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "GATEWAY_ERROR");
}

// ---------------------------------------------------------------------------
// Test: malformed gateway payloads are the caller's fault, not the gateway's
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gateway_payload_error_returns_400_validation() {
    let err = AppError::Gateway(GatewayError::Payload("order_code is required".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "order_code is required");
}

// ---------------------------------------------------------------------------
// Test: sqlx::Error::RowNotFound maps to 400 NOT_FOUND
// ---------------------------------------------------------------------------

#[tokio::test]
async fn row_not_found_returns_400() {
    let err = AppError::Database(sqlx::Error::RowNotFound);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Resource not found");
}
