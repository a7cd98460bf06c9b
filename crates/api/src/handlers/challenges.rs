//! Handlers for challenge progress: daily run submission and the current
//! progress view.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strider_core::challenge::ChallengeWindow;
use strider_core::error::{CoreError, StateCode};
use strider_core::milestones::{self, DayMilestones, MilestoneState};
use strider_core::types::DbId;
use strider_db::models::challenge::Challenge;
use strider_db::models::run_history::RunHistory;
use strider_db::models::status::UserChallengeStatus;
use strider_db::models::user_challenge::UserChallenge;
use strider_db::repositories::{ChallengeRepo, EnrollmentRepo, RunHistoryRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers (shared with the gift box handlers)
// ---------------------------------------------------------------------------

/// Fetch the caller's current challenge enrollment.
pub(crate) async fn find_current(state: &AppState, user_id: DbId) -> AppResult<UserChallenge> {
    EnrollmentRepo::find_current(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Current challenge",
            key: user_id.to_string(),
        }))
}

/// Load the enrollment's challenge template.
pub(crate) async fn template(state: &AppState, uc: &UserChallenge) -> AppResult<Challenge> {
    ChallengeRepo::find_by_id(&state.pool, uc.challenge_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!(
                "challenge template {} missing for enrollment {}",
                uc.challenge_id, uc.id
            ))
        })
}

/// The run window of a paid enrollment; unpaid ones have not started.
fn paid_window(uc: &UserChallenge) -> Result<ChallengeWindow, AppError> {
    match (uc.is_paid, uc.start_date, uc.end_date) {
        (true, Some(start), Some(end)) => Ok(ChallengeWindow { start, end }),
        _ => Err(AppError::Core(CoreError::state(
            StateCode::ErrorStartDate,
            "challenge has not started yet",
        ))),
    }
}

// ---------------------------------------------------------------------------
// Submit today's run
// ---------------------------------------------------------------------------

/// Body of `PUT /challenges/histories/update`.
#[derive(Debug, Deserialize)]
pub struct UpdateRunRequest {
    /// The day's cumulative distance in kilometres (not a delta).
    pub total_run: f64,
}

/// Result of a run submission.
#[derive(Debug, Serialize)]
pub struct RunProgress {
    pub run_history: RunHistory,
    /// Cumulative kilometres over the whole enrollment.
    pub total_run: f64,
    pub current_gift_milestone: i64,
}

/// PUT /api/v1/challenges/histories/update
///
/// Record today's distance for the caller's active challenge. Same-day
/// resubmission replaces the day's value; submissions outside the window
/// fail with `ERROR_START_DATE` / `ERROR_END_DATE`.
pub async fn update_run_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateRunRequest>,
) -> AppResult<impl IntoResponse> {
    if !body.total_run.is_finite() || body.total_run < 0.0 {
        return Err(
            CoreError::Validation("total_run must be a non-negative number".into()).into(),
        );
    }

    // 1. The caller needs a paid current challenge with an open window.
    let uc = find_current(&state, auth.user_id).await?;
    let window = paid_window(&uc)?;
    let now = Utc::now();
    window.check_submit(now)?;

    // 2. Upsert the day and refresh the reached milestone.
    let challenge = template(&state, &uc).await?;
    let (row, total, reached) = RunHistoryRepo::submit_day(
        &state.pool,
        uc.id,
        now.date_naive(),
        body.total_run,
        &challenge.gift_milestones,
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        user_challenge_id = uc.id,
        total_run = total,
        current_gift_milestone = reached,
        "run history updated",
    );

    Ok(Json(DataResponse {
        data: RunProgress {
            run_history: row,
            total_run: total,
            current_gift_milestone: reached,
        },
    }))
}

// ---------------------------------------------------------------------------
// Current progress
// ---------------------------------------------------------------------------

/// Full progress view for the active challenge.
#[derive(Debug, Serialize)]
pub struct ChallengeProgress {
    pub user_challenge: UserChallenge,
    pub challenge: Challenge,
    /// Cumulative kilometres over the whole window.
    pub total_run: f64,
    pub milestones: Vec<MilestoneState>,
    /// Per-day unopened milestone crossings, for the gift chart.
    pub chart: Vec<DayMilestones>,
}

/// GET /api/v1/challenges/histories/current
///
/// Full progress for the caller's current challenge. Evaluation is lazy:
/// a paid challenge whose target is reached or whose window has elapsed is
/// finalized here before the view is built.
pub async fn current_challenge(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mut uc = find_current(&state, auth.user_id).await?;

    if uc.is_paid && uc.status_id == UserChallengeStatus::CreateNew.id() {
        if let Some(updated) =
            EnrollmentRepo::finalize_if_due(&state.pool, uc.id, Utc::now()).await?
        {
            tracing::info!(
                user_challenge_id = updated.id,
                status_id = updated.status_id,
                "challenge finalized on progress read",
            );
            uc = updated;
        }
    }

    let challenge = template(&state, &uc).await?;
    let days = RunHistoryRepo::list_days(&state.pool, uc.id).await?;
    let daily: Vec<(NaiveDate, f64)> = days.iter().map(|d| (d.run_date, d.total_run)).collect();
    let total_run: f64 = daily.iter().map(|(_, run)| run).sum();

    let milestones = milestones::milestone_states(
        &challenge.gift_milestones,
        &uc.opened_milestones,
        uc.current_gift_milestone,
    );
    let chart = milestones::chart(&challenge.gift_milestones, &uc.opened_milestones, &daily);

    Ok(Json(DataResponse {
        data: ChallengeProgress {
            user_challenge: uc,
            challenge,
            total_run,
            milestones,
            chart,
        },
    }))
}
