//! Route definitions for the `/challenges` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::challenges;
use crate::state::AppState;

/// Routes mounted at `/challenges`.
///
/// ```text
/// PUT    /histories/update    -> update_run_history
/// GET    /histories/current   -> current_challenge
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/histories/update", put(challenges::update_run_history))
        .route("/histories/current", get(challenges::current_challenge))
}
