//! Handlers for milestone gift boxes.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use strider_core::error::{CoreError, StateCode};
use strider_core::milestones;
use strider_core::reward::RewardPlan;
use strider_db::repositories::{GiftBoxRepo, GiftOutcome};

use crate::error::AppResult;
use crate::handlers::challenges::{find_current, template};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query of `GET /giftboxs/challenges/open`.
#[derive(Debug, Deserialize)]
pub struct OpenGiftQuery {
    pub milestone: i64,
}

/// GET /api/v1/giftboxs/challenges/open?milestone=<m>
///
/// Open the gift box for a reached milestone of the caller's current
/// challenge and resolve its reward. Each milestone opens exactly once;
/// a repeat fails with `GIFT_ALREADY_OPENED`.
pub async fn open_challenge_gift(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<OpenGiftQuery>,
) -> AppResult<impl IntoResponse> {
    // 1. The milestone must belong to the challenge, be reached, and be
    //    unopened.
    let uc = find_current(&state, auth.user_id).await?;
    let challenge = template(&state, &uc).await?;
    milestones::check_open(
        &challenge.gift_milestones,
        &uc.opened_milestones,
        query.milestone,
        uc.current_gift_milestone,
    )?;

    // 2. Draw the reward plan up front; the repository resolves it against
    //    inventory inside its transaction, with point fallbacks.
    let plan = RewardPlan::draw(&mut rand::rng(), state.config.reward.max_bonus_point);

    match GiftBoxRepo::open(&state.pool, auth.user_id, uc.id, query.milestone, plan).await? {
        GiftOutcome::Opened(reward) => {
            tracing::info!(
                user_id = auth.user_id,
                user_challenge_id = uc.id,
                milestone = query.milestone,
                kind = ?reward.kind,
                "gift box opened",
            );
            Ok(Json(DataResponse { data: reward }))
        }
        // Lost the race against a concurrent open of the same box.
        GiftOutcome::AlreadyOpened => Err(CoreError::state(
            StateCode::GiftAlreadyOpened,
            "gift box already opened",
        )
        .into()),
    }
}
