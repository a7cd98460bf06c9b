//! Challenge template models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strider_core::types::{DbId, Timestamp};

/// A row from the `challenges` table.
///
/// The `discount_*` columns describe a limited early-bird discount: each
/// discounted settlement decrements `discount_remaining`, and the window is
/// cleared entirely once it reaches zero.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Challenge {
    pub id: DbId,
    pub title: String,
    /// Challenge length in calendar days.
    pub total_date: i32,
    /// Target distance in kilometres.
    pub total_run: f64,
    pub price: i64,
    /// Ascending distance thresholds that unlock gift boxes.
    pub gift_milestones: Vec<i64>,
    pub discount_amount: Option<i64>,
    pub discount_remaining: i32,
    pub discount_from: Option<Timestamp>,
    pub discount_to: Option<Timestamp>,
    pub submitted_before_day: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a challenge template.
#[derive(Debug, Deserialize)]
pub struct CreateChallenge {
    pub title: String,
    pub total_date: i32,
    pub total_run: f64,
    pub price: i64,
    pub gift_milestones: Vec<i64>,
    pub discount_amount: Option<i64>,
    pub discount_remaining: Option<i32>,
    pub discount_from: Option<Timestamp>,
    pub discount_to: Option<Timestamp>,
    pub submitted_before_day: Option<i32>,
}
