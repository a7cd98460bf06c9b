pub mod challenges;
pub mod giftbox;
pub mod health;
pub mod payments;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /payments/challenge/create      create/refresh unpaid enrollment (POST, auth)
/// /payments/challenge/confirm     gateway confirm + settlement (PUT, auth)
/// /payments/alepay/confirm        Alepay webhook (PUT, check_key)
///
/// /challenges/histories/update    submit today's distance (PUT, auth)
/// /challenges/histories/current   progress + gift chart (GET, auth)
///
/// /giftboxs/challenges/open       open a milestone gift box (GET, auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Enrollment payments and gateway confirmations.
        .nest("/payments", payments::router())
        // Daily run tracking and challenge progress.
        .nest("/challenges", challenges::router())
        // Milestone gift boxes.
        .nest("/giftboxs", giftbox::router())
}
