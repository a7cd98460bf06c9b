//! Tests for the JWT auth extractor and webhook authentication.
//!
//! The rejection paths never reach the database, so they run against a
//! lazy pool and need no PostgreSQL. The accepted-token test is
//! database-backed and `#[ignore]`d.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, put_json};
use sqlx::PgPool;

use strider_api::auth::jwt::{generate_access_token, JwtConfig};

const CURRENT_URI: &str = "/api/v1/challenges/histories/current";

// ---------------------------------------------------------------------------
// Rejection paths (no database)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_authorization_header_returns_401() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get(app, CURRENT_URI).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Missing Authorization header");
}

#[tokio::test]
async fn non_bearer_authorization_returns_401() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get_auth(app, CURRENT_URI, "Basic dXNlcjpwYXNz").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(
        json["error"],
        "Invalid Authorization format. Expected: Bearer <token>"
    );
}

#[tokio::test]
async fn garbage_token_returns_401() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get_auth(app, CURRENT_URI, "Bearer not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn token_signed_with_other_secret_returns_401() {
    let foreign = JwtConfig {
        secret: "a-completely-different-signing-secret".to_string(),
        access_token_expiry_mins: 15,
    };
    let token = generate_access_token(1, &foreign).expect("token generation must succeed");

    let app = common::build_test_app(common::lazy_pool());
    let response = get_auth(app, CURRENT_URI, &format!("Bearer {token}")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

// ---------------------------------------------------------------------------
// Webhook authentication (check_key, not JWT)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn webhook_rejects_wrong_check_key_without_jwt() {
    let app = common::build_test_app(common::lazy_pool());

    // No Authorization header at all: the webhook authenticates with
    // check_key instead and must reject on that, not on a missing JWT.
    let response = put_json(
        app,
        "/api/v1/payments/alepay/confirm",
        serde_json::json!({ "check_key": "wrong", "data": "" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "invalid check_key");
}

// ---------------------------------------------------------------------------
// Accepted token reaches the handler (database-backed)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
#[ignore]
async fn test_valid_token_reaches_the_handler(pool: PgPool) {
    let user_id = common::seed_user(&pool, "runner").await;
    let bearer = common::bearer_for(user_id);

    let app = common::build_test_app(pool);
    let response = get_auth(app, CURRENT_URI, &bearer).await;

    // The token is accepted; the 400 is the handler reporting that this
    // user has no current challenge yet.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}
