//! Enrollment (user challenge) models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strider_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `user_challenges` table.
///
/// `total_run` is the target distance copied from the template at enrollment
/// time; `current_gift_milestone` is the highest milestone the cumulative
/// distance has covered (0 when none).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserChallenge {
    pub id: DbId,
    pub user_id: DbId,
    pub challenge_id: DbId,
    pub group_id: Option<DbId>,
    pub order_id: String,
    pub paid_type: Option<StatusId>,
    pub is_paid: bool,
    pub is_current: bool,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub total_run: f64,
    pub current_gift_milestone: i64,
    pub opened_milestones: Vec<i64>,
    pub status_id: StatusId,
    /// Referral code supplied at enrollment; belongs to the referrer.
    pub referral_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Decrypted payload of `POST /api/v1/payments/challenge/create`.
#[derive(Debug, Deserialize)]
pub struct EnrollChallenge {
    pub challenge_id: DbId,
    pub group_id: Option<DbId>,
    /// Intended gateway, recorded ahead of confirmation.
    pub paid_type: Option<StatusId>,
    pub order_id: String,
    pub referral_code: Option<String>,
}
