//! Repository for the `run_histories` table.
//!
//! One row per enrollment per day; the same-day unique key makes
//! resubmission a replacement, never a double count.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use strider_core::milestones;
use strider_core::types::DbId;

use crate::models::run_history::RunHistory;

/// Column list for `run_histories` queries.
const COLUMNS: &str = "id, user_challenge_id, run_date, total_run, created_at, updated_at";

/// Daily run submissions and distance aggregation.
pub struct RunHistoryRepo;

impl RunHistoryRepo {
    /// Record a day's distance and refresh the enrollment's reached
    /// milestone, atomically.
    ///
    /// `milestones` is the challenge's threshold list. Returns the stored row
    /// together with the new cumulative total and reached milestone.
    pub async fn submit_day(
        pool: &PgPool,
        user_challenge_id: DbId,
        run_date: NaiveDate,
        total_run: f64,
        milestones: &[i64],
    ) -> Result<(RunHistory, f64, i64), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO run_histories (user_challenge_id, run_date, total_run) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_challenge_id, run_date) \
             DO UPDATE SET total_run = EXCLUDED.total_run \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, RunHistory>(&query)
            .bind(user_challenge_id)
            .bind(run_date)
            .bind(total_run)
            .fetch_one(&mut *tx)
            .await?;

        let total = Self::total_run_in_tx(&mut *tx, user_challenge_id).await?;
        let reached = milestones::highest_reached(milestones, total);

        sqlx::query("UPDATE user_challenges SET current_gift_milestone = $2 WHERE id = $1")
            .bind(user_challenge_id)
            .bind(reached)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((row, total, reached))
    }

    /// Cumulative distance over the whole enrollment. Empty set is 0.
    pub async fn total_run(pool: &PgPool, user_challenge_id: DbId) -> Result<f64, sqlx::Error> {
        let row: (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_run), 0) FROM run_histories WHERE user_challenge_id = $1",
        )
        .bind(user_challenge_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn total_run_in_tx(
        conn: &mut PgConnection,
        user_challenge_id: DbId,
    ) -> Result<f64, sqlx::Error> {
        let row: (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_run), 0) FROM run_histories WHERE user_challenge_id = $1",
        )
        .bind(user_challenge_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.0)
    }

    /// Cumulative distance over `[start, end]` (inclusive). Empty set is 0.
    pub async fn total_run_between(
        pool: &PgPool,
        user_challenge_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, sqlx::Error> {
        let row: (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_run), 0) FROM run_histories \
             WHERE user_challenge_id = $1 AND run_date BETWEEN $2 AND $3",
        )
        .bind(user_challenge_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// All submitted days in date order, for the progress chart.
    pub async fn list_days(
        pool: &PgPool,
        user_challenge_id: DbId,
    ) -> Result<Vec<RunHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM run_histories \
             WHERE user_challenge_id = $1 \
             ORDER BY run_date ASC"
        );
        sqlx::query_as::<_, RunHistory>(&query)
            .bind(user_challenge_id)
            .fetch_all(pool)
            .await
    }
}
