//! Repository for the shared discount code pool and per-user grants.
//!
//! Pool rows count uses down; the consumption that would reach zero deletes
//! the row instead, so `number_of_uses` can never go negative and a lookup
//! miss means the code is spent.

use sqlx::{PgConnection, PgPool};
use strider_core::types::DbId;

use crate::models::discount::{CreateDiscountCode, DiscountCode, UserDiscountCode};

/// Column list for `discount_codes` queries.
const COLUMNS: &str = "id, code, number_of_uses, expire_date, kind_id, created_at, updated_at";

/// Column list for `user_discount_codes` queries.
const USER_COLUMNS: &str = "id, user_id, code, expire_date, kind_id, created_at, updated_at";

/// Shared-pool consumption and gift-box grants.
pub struct DiscountCodeRepo;

impl DiscountCodeRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateDiscountCode,
    ) -> Result<DiscountCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO discount_codes (code, number_of_uses, expire_date, kind_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiscountCode>(&query)
            .bind(&input.code)
            .bind(input.number_of_uses)
            .bind(input.expire_date)
            .bind(input.kind_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<DiscountCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM discount_codes WHERE code = $1");
        sqlx::query_as::<_, DiscountCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Take one use of `code` under a row lock: decrement at 2+, delete at 1.
    ///
    /// Returns the pool row as it was before consumption, or `None` when the
    /// code does not exist (spent or never issued).
    pub async fn consume_in_tx(
        conn: &mut PgConnection,
        code: &str,
    ) -> Result<Option<DiscountCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM discount_codes WHERE code = $1 FOR UPDATE");
        let Some(row) = sqlx::query_as::<_, DiscountCode>(&query)
            .bind(code)
            .fetch_optional(&mut *conn)
            .await?
        else {
            return Ok(None);
        };

        Self::take_use_in_tx(conn, &row).await?;
        Ok(Some(row))
    }

    /// Pick a random live pool code for a gift grant. `SKIP LOCKED` keeps
    /// two concurrent opens off the same row.
    pub async fn draw_random_in_tx(
        conn: &mut PgConnection,
    ) -> Result<Option<DiscountCode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discount_codes \
             WHERE number_of_uses > 0 \
               AND (expire_date IS NULL OR expire_date > NOW()) \
             ORDER BY RANDOM() \
             LIMIT 1 \
             FOR UPDATE SKIP LOCKED"
        );
        sqlx::query_as::<_, DiscountCode>(&query)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Move one use of a locked pool row to `user_id`.
    pub async fn grant_to_user_in_tx(
        conn: &mut PgConnection,
        user_id: DbId,
        code: &DiscountCode,
    ) -> Result<UserDiscountCode, sqlx::Error> {
        Self::take_use_in_tx(conn, code).await?;

        let query = format!(
            "INSERT INTO user_discount_codes (user_id, code, expire_date, kind_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserDiscountCode>(&query)
            .bind(user_id)
            .bind(&code.code)
            .bind(code.expire_date)
            .bind(code.kind_id)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserDiscountCode>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM user_discount_codes \
             WHERE user_id = $1 \
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, UserDiscountCode>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    async fn take_use_in_tx(
        conn: &mut PgConnection,
        row: &DiscountCode,
    ) -> Result<(), sqlx::Error> {
        if row.number_of_uses > 1 {
            sqlx::query(
                "UPDATE discount_codes SET number_of_uses = number_of_uses - 1 WHERE id = $1",
            )
            .bind(row.id)
            .execute(&mut *conn)
            .await?;
        } else {
            sqlx::query("DELETE FROM discount_codes WHERE id = $1")
                .bind(row.id)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }
}
