//! Point ledger models.

use serde::Serialize;
use sqlx::FromRow;
use strider_core::types::{DbId, Timestamp};

/// A row from the append-only `point_histories` table.
///
/// `balance` is the balance after applying `amount`, so the ledger can be
/// audited without replaying it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PointHistory {
    pub id: DbId,
    pub user_id: DbId,
    pub amount: i64,
    pub balance: i64,
    pub reason: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
