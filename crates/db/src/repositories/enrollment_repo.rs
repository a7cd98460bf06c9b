//! Repository for the `user_challenges` table: enrollment lifecycle,
//! settlement marking, and terminal evaluation.
//!
//! Uses `UserChallengeStatus` for all status transitions; a partial unique
//! index (`uq_user_challenges_current`) backs the one-current-per-user rule.

use sqlx::{PgConnection, PgPool};
use strider_core::challenge::{self, ChallengeWindow, EvaluationOutcome};
use strider_core::types::{DbId, Timestamp};

use crate::models::challenge::Challenge;
use crate::models::status::{PaidType, UserChallengeStatus};
use crate::models::user_challenge::{EnrollChallenge, UserChallenge};
use crate::repositories::point_repo::{PointRepo, REASON_CHALLENGE_COMPLETED};
use crate::repositories::run_history_repo::RunHistoryRepo;

/// Column list for `user_challenges` queries.
const COLUMNS: &str = "\
    id, user_id, challenge_id, group_id, order_id, paid_type, \
    is_paid, is_current, start_date, end_date, total_run, \
    current_gift_milestone, opened_milestones, status_id, referral_code, \
    created_at, updated_at";

/// Enrollment lifecycle operations.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    pub async fn find_current(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserChallenge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_challenges WHERE user_id = $1 AND is_current");
        sqlx::query_as::<_, UserChallenge>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_order_id(
        pool: &PgPool,
        order_id: &str,
    ) -> Result<Option<UserChallenge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_challenges WHERE order_id = $1");
        sqlx::query_as::<_, UserChallenge>(&query)
            .bind(order_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a fresh unpaid current enrollment.
    pub async fn create_current(
        pool: &PgPool,
        user_id: DbId,
        challenge: &Challenge,
        input: &EnrollChallenge,
    ) -> Result<UserChallenge, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_challenges \
                (user_id, challenge_id, group_id, order_id, paid_type, total_run, \
                 status_id, referral_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserChallenge>(&query)
            .bind(user_id)
            .bind(challenge.id)
            .bind(input.group_id)
            .bind(&input.order_id)
            .bind(input.paid_type)
            .bind(challenge.total_run)
            .bind(UserChallengeStatus::CreateNew.id())
            .bind(&input.referral_code)
            .fetch_one(pool)
            .await
    }

    /// Overwrite an unpaid current enrollment in place (retry before
    /// payment). The `NOT is_paid` guard makes a lost race against
    /// settlement a no-op.
    pub async fn overwrite_current(
        pool: &PgPool,
        id: DbId,
        challenge: &Challenge,
        input: &EnrollChallenge,
    ) -> Result<Option<UserChallenge>, sqlx::Error> {
        let query = format!(
            "UPDATE user_challenges \
             SET challenge_id = $2, group_id = $3, order_id = $4, paid_type = $5, \
                 total_run = $6, referral_code = $7, status_id = $8, \
                 is_paid = FALSE, start_date = NULL, end_date = NULL, \
                 current_gift_milestone = 0, opened_milestones = '{{}}' \
             WHERE id = $1 AND NOT is_paid \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserChallenge>(&query)
            .bind(id)
            .bind(challenge.id)
            .bind(input.group_id)
            .bind(&input.order_id)
            .bind(input.paid_type)
            .bind(challenge.total_run)
            .bind(&input.referral_code)
            .bind(UserChallengeStatus::CreateNew.id())
            .fetch_optional(pool)
            .await
    }

    /// Lock an enrollment by its order for the settlement transaction.
    pub async fn lock_by_order_id_in_tx(
        conn: &mut PgConnection,
        order_id: &str,
    ) -> Result<Option<UserChallenge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_challenges WHERE order_id = $1 FOR UPDATE");
        sqlx::query_as::<_, UserChallenge>(&query)
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Mark an enrollment paid and open its run window.
    pub async fn settle_in_tx(
        conn: &mut PgConnection,
        id: DbId,
        paid_type: PaidType,
        window: &ChallengeWindow,
    ) -> Result<UserChallenge, sqlx::Error> {
        let query = format!(
            "UPDATE user_challenges \
             SET is_paid = TRUE, paid_type = $2, start_date = $3, end_date = $4, \
                 current_gift_milestone = 0, opened_milestones = '{{}}', status_id = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserChallenge>(&query)
            .bind(id)
            .bind(paid_type.id())
            .bind(window.start)
            .bind(window.end)
            .bind(UserChallengeStatus::CreateNew.id())
            .fetch_one(&mut *conn)
            .await
    }

    /// Enrollments whose window has elapsed while still CreateNew, for the
    /// evaluation sweep.
    pub async fn list_due_for_evaluation(
        pool: &PgPool,
        now: Timestamp,
        limit: i64,
    ) -> Result<Vec<UserChallenge>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_challenges \
             WHERE is_paid AND status_id = $1 AND end_date < $2 \
             ORDER BY end_date ASC \
             LIMIT $3"
        );
        sqlx::query_as::<_, UserChallenge>(&query)
            .bind(UserChallengeStatus::CreateNew.id())
            .bind(now)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Evaluate one paid CreateNew enrollment and finalize it if the target
    /// is reached or the window has elapsed.
    ///
    /// Completion credits `price + total_run * 100` points exactly once: the
    /// credit is tied to the status transition, which is guarded by
    /// `status_id = 1` on the update itself.
    ///
    /// Returns the updated row when a transition happened.
    pub async fn finalize_if_due(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<UserChallenge>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM user_challenges WHERE id = $1 FOR UPDATE");
        let Some(uc) = sqlx::query_as::<_, UserChallenge>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        if !uc.is_paid || uc.status_id != UserChallengeStatus::CreateNew.id() {
            tx.rollback().await?;
            return Ok(None);
        }
        let Some(end_date) = uc.end_date else {
            tx.rollback().await?;
            return Ok(None);
        };

        let total = RunHistoryRepo::total_run_in_tx(&mut *tx, uc.id).await?;
        let outcome = challenge::evaluate(now, end_date, total, uc.total_run);
        let next_status = match outcome {
            EvaluationOutcome::StillRunning => {
                tx.rollback().await?;
                return Ok(None);
            }
            EvaluationOutcome::Completed => UserChallengeStatus::Completed,
            EvaluationOutcome::NotCompleted => UserChallengeStatus::NotCompleted,
        };

        let query = format!(
            "UPDATE user_challenges SET status_id = $2 \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        let Some(updated) = sqlx::query_as::<_, UserChallenge>(&query)
            .bind(uc.id)
            .bind(next_status.id())
            .bind(UserChallengeStatus::CreateNew.id())
            .fetch_optional(&mut *tx)
            .await?
        else {
            // Lost a race with another evaluator.
            tx.rollback().await?;
            return Ok(None);
        };

        if next_status == UserChallengeStatus::Completed {
            let price: Option<(i64,)> = sqlx::query_as("SELECT price FROM challenges WHERE id = $1")
                .bind(uc.challenge_id)
                .fetch_optional(&mut *tx)
                .await?;
            let price = price.map(|p| p.0).unwrap_or(0);
            let points = challenge::completion_points(price, uc.total_run);
            PointRepo::credit_in_tx(&mut *tx, uc.user_id, points, REASON_CHALLENGE_COMPLETED)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(updated))
    }
}
