//! Repository for the `deliveries` table.
//!
//! Deliveries are created by the store checkout (out of scope here) and show
//! up in this service as the non-challenge settlement target of the payment
//! webhook.

use sqlx::{PgConnection, PgPool};

use crate::models::delivery::{CreateDelivery, Delivery};
use crate::models::status::DeliveryStatus;

/// Column list for `deliveries` queries.
const COLUMNS: &str = "id, user_id, order_id, status_id, total, created_at, updated_at";

pub struct DeliveryRepo;

impl DeliveryRepo {
    pub async fn create(pool: &PgPool, input: &CreateDelivery) -> Result<Delivery, sqlx::Error> {
        let query = format!(
            "INSERT INTO deliveries (user_id, order_id, status_id, total) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Delivery>(&query)
            .bind(input.user_id)
            .bind(&input.order_id)
            .bind(DeliveryStatus::Pending.id())
            .bind(input.total)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_order_id(
        pool: &PgPool,
        order_id: &str,
    ) -> Result<Option<Delivery>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deliveries WHERE order_id = $1");
        sqlx::query_as::<_, Delivery>(&query)
            .bind(order_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn lock_by_order_id_in_tx(
        conn: &mut PgConnection,
        order_id: &str,
    ) -> Result<Option<Delivery>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deliveries WHERE order_id = $1 FOR UPDATE");
        sqlx::query_as::<_, Delivery>(&query)
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Pending → Paid transition. Returns `None` when the row was not
    /// Pending (already paid or cancelled).
    pub async fn mark_paid_in_tx(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Delivery>, sqlx::Error> {
        let query = format!(
            "UPDATE deliveries SET status_id = $2 \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Delivery>(&query)
            .bind(id)
            .bind(DeliveryStatus::Paid.id())
            .bind(DeliveryStatus::Pending.id())
            .fetch_optional(&mut *conn)
            .await
    }
}
