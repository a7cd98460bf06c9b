//! Discount code models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strider_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the shared `discount_codes` pool.
///
/// `number_of_uses` counts down on each consumption; the row is deleted when
/// it would reach zero, so a lookup miss means the code is spent or never
/// existed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DiscountCode {
    pub id: DbId,
    pub code: String,
    pub number_of_uses: i32,
    pub expire_date: Option<Timestamp>,
    pub kind_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A code granted to one user from a gift box.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserDiscountCode {
    pub id: DbId,
    pub user_id: DbId,
    pub code: String,
    pub expire_date: Option<Timestamp>,
    pub kind_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a code to the shared pool.
#[derive(Debug, Deserialize)]
pub struct CreateDiscountCode {
    pub code: String,
    pub number_of_uses: i32,
    pub expire_date: Option<Timestamp>,
    pub kind_id: StatusId,
}
