//! Product delivery models (the non-challenge settlement target).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strider_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `deliveries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Delivery {
    pub id: DbId,
    pub user_id: DbId,
    pub order_id: String,
    pub status_id: StatusId,
    pub total: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a pending delivery awaiting payment.
#[derive(Debug, Deserialize)]
pub struct CreateDelivery {
    pub user_id: DbId,
    pub order_id: String,
    pub total: i64,
}
