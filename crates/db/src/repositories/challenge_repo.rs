//! Repository for the `challenges` template table.

use sqlx::{PgConnection, PgPool};
use strider_core::types::{DbId, Timestamp};

use crate::models::challenge::{Challenge, CreateChallenge};

/// Column list for `challenges` queries.
const COLUMNS: &str = "\
    id, title, total_date, total_run, price, gift_milestones, \
    discount_amount, discount_remaining, discount_from, discount_to, \
    submitted_before_day, created_at, updated_at";

/// Accessors for challenge templates and their early-bird discount window.
pub struct ChallengeRepo;

impl ChallengeRepo {
    pub async fn create(pool: &PgPool, input: &CreateChallenge) -> Result<Challenge, sqlx::Error> {
        let query = format!(
            "INSERT INTO challenges \
                (title, total_date, total_run, price, gift_milestones, \
                 discount_amount, discount_remaining, discount_from, discount_to, \
                 submitted_before_day) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Challenge>(&query)
            .bind(&input.title)
            .bind(input.total_date)
            .bind(input.total_run)
            .bind(input.price)
            .bind(&input.gift_milestones)
            .bind(input.discount_amount)
            .bind(input.discount_remaining.unwrap_or(0))
            .bind(input.discount_from)
            .bind(input.discount_to)
            .bind(input.submitted_before_day)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Challenge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM challenges WHERE id = $1");
        sqlx::query_as::<_, Challenge>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock the template row inside a settlement transaction; the discount
    /// counter lives here, so the lock serializes concurrent decrements.
    pub async fn lock_by_id_in_tx(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Challenge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM challenges WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Challenge>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Take one use of the early-bird discount if the window is open at
    /// `now`. The decrement that reaches zero clears the window entirely.
    ///
    /// Returns whether a use was taken.
    pub async fn consume_discount_in_tx(
        conn: &mut PgConnection,
        id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE challenges \
             SET discount_remaining = discount_remaining - 1, \
                 discount_amount = CASE WHEN discount_remaining <= 1 THEN NULL ELSE discount_amount END, \
                 discount_from = CASE WHEN discount_remaining <= 1 THEN NULL ELSE discount_from END, \
                 discount_to = CASE WHEN discount_remaining <= 1 THEN NULL ELSE discount_to END \
             WHERE id = $1 \
               AND discount_amount IS NOT NULL \
               AND discount_remaining > 0 \
               AND discount_from <= $2 \
               AND discount_to >= $2",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
