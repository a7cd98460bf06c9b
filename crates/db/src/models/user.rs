//! User entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strider_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    /// The code this user hands out to refer others.
    pub referral_code: String,
    /// Set once a settlement of this user's own order has granted a referral
    /// bonus; keeps the bonus one-shot per user.
    pub referral_redeemed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a user (seeding and tests; registration is out of scope).
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub referral_code: String,
}
