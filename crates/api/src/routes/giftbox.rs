//! Route definitions for the `/giftboxs` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::giftbox;
use crate::state::AppState;

/// Routes mounted at `/giftboxs`.
///
/// ```text
/// GET    /challenges/open?milestone=<m>    -> open_challenge_gift
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/challenges/open", get(giftbox::open_challenge_gift))
}
