//! Repository for the `payment_histories` ledger.
//!
//! One row per order_id; retries update in place and every raw gateway
//! payload seen for the order is appended to `gateway_payloads`.

use sqlx::{PgConnection, PgPool};
use strider_core::types::DbId;

use crate::models::payment::{PaymentAmounts, PaymentHistory};
use crate::models::status::{PaidType, PaymentStatus};

/// Column list for `payment_histories` queries.
const COLUMNS: &str = "\
    id, order_id, user_id, challenge_id, user_challenge_id, delivery_id, \
    paid_type, total, total_pay, discount, fee, status_id, gateway_payloads, \
    created_at, updated_at";

/// What a ledger upsert records about one gateway confirmation.
#[derive(Debug, Clone)]
pub struct RecordPayment<'a> {
    pub order_id: &'a str,
    pub user_id: DbId,
    pub challenge_id: Option<DbId>,
    pub user_challenge_id: Option<DbId>,
    pub delivery_id: Option<DbId>,
    pub paid_type: PaidType,
    pub amounts: PaymentAmounts,
    pub gateway_payload: serde_json::Value,
}

/// Ledger upserts and lookups.
pub struct PaymentHistoryRepo;

impl PaymentHistoryRepo {
    pub async fn find_by_order_id(
        pool: &PgPool,
        order_id: &str,
    ) -> Result<Option<PaymentHistory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_histories WHERE order_id = $1");
        sqlx::query_as::<_, PaymentHistory>(&query)
            .bind(order_id)
            .fetch_optional(pool)
            .await
    }

    /// Upsert the order's ledger row as Settled inside the settlement
    /// transaction.
    pub async fn record_settled_in_tx(
        conn: &mut PgConnection,
        record: &RecordPayment<'_>,
    ) -> Result<PaymentHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO payment_histories \
                (order_id, user_id, challenge_id, user_challenge_id, delivery_id, \
                 paid_type, total, total_pay, discount, fee, status_id, gateway_payloads) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, jsonb_build_array($12::jsonb)) \
             ON CONFLICT (order_id) DO UPDATE SET \
                 status_id = EXCLUDED.status_id, \
                 paid_type = EXCLUDED.paid_type, \
                 total = EXCLUDED.total, \
                 total_pay = EXCLUDED.total_pay, \
                 discount = EXCLUDED.discount, \
                 fee = EXCLUDED.fee, \
                 gateway_payloads = payment_histories.gateway_payloads || EXCLUDED.gateway_payloads \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentHistory>(&query)
            .bind(record.order_id)
            .bind(record.user_id)
            .bind(record.challenge_id)
            .bind(record.user_challenge_id)
            .bind(record.delivery_id)
            .bind(record.paid_type.id())
            .bind(record.amounts.total)
            .bind(record.amounts.total_pay)
            .bind(record.amounts.discount)
            .bind(record.amounts.fee)
            .bind(PaymentStatus::Settled.id())
            .bind(&record.gateway_payload)
            .fetch_one(&mut *conn)
            .await
    }

    /// Record a failed confirmation attempt. Never downgrades a Settled row;
    /// in that case only the payload is appended.
    pub async fn record_failed(
        pool: &PgPool,
        record: &RecordPayment<'_>,
    ) -> Result<PaymentHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO payment_histories \
                (order_id, user_id, challenge_id, user_challenge_id, delivery_id, \
                 paid_type, total, total_pay, discount, fee, status_id, gateway_payloads) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, jsonb_build_array($12::jsonb)) \
             ON CONFLICT (order_id) DO UPDATE SET \
                 status_id = CASE \
                     WHEN payment_histories.status_id = {settled} THEN payment_histories.status_id \
                     ELSE EXCLUDED.status_id \
                 END, \
                 gateway_payloads = payment_histories.gateway_payloads || EXCLUDED.gateway_payloads \
             RETURNING {COLUMNS}",
            settled = PaymentStatus::Settled.id(),
        );
        sqlx::query_as::<_, PaymentHistory>(&query)
            .bind(record.order_id)
            .bind(record.user_id)
            .bind(record.challenge_id)
            .bind(record.user_challenge_id)
            .bind(record.delivery_id)
            .bind(record.paid_type.id())
            .bind(record.amounts.total)
            .bind(record.amounts.total_pay)
            .bind(record.amounts.discount)
            .bind(record.amounts.fee)
            .bind(PaymentStatus::Failed.id())
            .bind(&record.gateway_payload)
            .fetch_one(pool)
            .await
    }
}
