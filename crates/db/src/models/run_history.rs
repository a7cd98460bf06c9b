//! Daily run submission models.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use strider_core::types::{DbId, Timestamp};

/// A row from the `run_histories` table: one per enrollment per day.
///
/// `total_run` is the day's cumulative distance as reported by the client,
/// not a delta; resubmitting the same day replaces it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RunHistory {
    pub id: DbId,
    pub user_challenge_id: DbId,
    pub run_date: NaiveDate,
    pub total_run: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
