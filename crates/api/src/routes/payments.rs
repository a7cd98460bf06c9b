//! Route definitions for the `/payments` resource.
//!
//! The challenge endpoints require authentication; the Alepay webhook
//! authenticates with `check_key` instead of a JWT.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// POST   /challenge/create    -> create_challenge_payment
/// PUT    /challenge/confirm   -> confirm_challenge_payment
/// PUT    /alepay/confirm      -> alepay_webhook
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/challenge/create", post(payments::create_challenge_payment))
        .route("/challenge/confirm", put(payments::confirm_challenge_payment))
        .route("/alepay/confirm", put(payments::alepay_webhook))
}
