//! Repository for point balances and the append-only point ledger.

use sqlx::{PgConnection, PgPool};
use strider_core::types::DbId;

use crate::models::point::PointHistory;

/// Ledger reasons used across the settlement and reward paths.
pub const REASON_CHALLENGE_COMPLETED: &str = "challenge_completed";
pub const REASON_REFERRAL_BONUS: &str = "referral_bonus";
pub const REASON_GIFT_BOX: &str = "gift_box";

/// Column list for `point_histories` queries.
const HISTORY_COLUMNS: &str = "id, user_id, amount, balance, reason, created_at, updated_at";

/// Point credit and balance accessors.
///
/// Credits are a single upsert on `point_balances`, so concurrent credits to
/// one user serialize on the row and both land.
pub struct PointRepo;

impl PointRepo {
    /// Credit `amount` points and append the ledger row. Returns the balance
    /// after the credit.
    pub async fn credit(
        pool: &PgPool,
        user_id: DbId,
        amount: i64,
        reason: &str,
    ) -> Result<i64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let balance = Self::credit_in_tx(&mut *tx, user_id, amount, reason).await?;
        tx.commit().await?;
        Ok(balance)
    }

    /// Credit within a caller-owned transaction (settlement, gift boxes).
    pub async fn credit_in_tx(
        conn: &mut PgConnection,
        user_id: DbId,
        amount: i64,
        reason: &str,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO point_balances (user_id, balance) \
             VALUES ($1, $2) \
             ON CONFLICT (user_id) \
             DO UPDATE SET balance = point_balances.balance + EXCLUDED.balance \
             RETURNING balance",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO point_histories (user_id, amount, balance, reason) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(amount)
        .bind(row.0)
        .bind(reason)
        .execute(&mut *conn)
        .await?;

        Ok(row.0)
    }

    /// Current balance; users without a row have 0.
    pub async fn balance(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT balance FROM point_balances WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|r| r.0).unwrap_or(0))
    }

    /// Most recent ledger entries first.
    pub async fn history(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<PointHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM point_histories \
             WHERE user_id = $1 \
             ORDER BY id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, PointHistory>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
