//! Gift box inventory, audit, and resolved reward models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strider_core::reward::RewardKind;
use strider_core::types::{DbId, Timestamp};

use super::discount::UserDiscountCode;

/// A row from the `gift_videos` reward inventory.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GiftVideo {
    pub id: DbId,
    pub title: String,
    pub url: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a video to the inventory.
#[derive(Debug, Deserialize)]
pub struct CreateGiftVideo {
    pub title: String,
    pub url: String,
}

/// A row from the immutable `gift_openings` audit table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GiftOpening {
    pub id: DbId,
    pub user_id: DbId,
    pub user_challenge_id: DbId,
    pub milestone: i64,
    pub video_id: Option<DbId>,
    pub points: Option<i64>,
    pub discount_code: Option<String>,
    /// The reward payload exactly as returned to the client.
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The reward a gift box resolved to, after inventory fallbacks.
///
/// `kind` is the resolved primary. A video reward also carries one of
/// `points` / `discount_code` as its secondary gift; a points or discount
/// reward sets only its own field.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedReward {
    pub kind: RewardKind,
    pub video: Option<GiftVideo>,
    pub points: Option<i64>,
    pub discount_code: Option<UserDiscountCode>,
}
