//! Payment ledger models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strider_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `payment_histories` table: one per order_id.
///
/// Exactly one of `user_challenge_id` / `delivery_id` is set (enforced by a
/// CHECK constraint). `gateway_payloads` is an append-only JSON array of the
/// raw gateway responses seen for this order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentHistory {
    pub id: DbId,
    pub order_id: String,
    pub user_id: DbId,
    pub challenge_id: Option<DbId>,
    pub user_challenge_id: Option<DbId>,
    pub delivery_id: Option<DbId>,
    pub paid_type: StatusId,
    pub total: i64,
    pub total_pay: i64,
    pub discount: i64,
    pub fee: i64,
    pub status_id: StatusId,
    pub gateway_payloads: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The money breakdown of one payment as reported by the client or gateway.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct PaymentAmounts {
    /// Order value before discount.
    pub total: i64,
    /// Amount actually charged.
    pub total_pay: i64,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub fee: i64,
}
