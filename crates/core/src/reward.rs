//! Weighted reward draws for gift boxes.
//!
//! Opening a gift box awards a workout video, bonus points, or a discount
//! code. A video additionally carries a secondary points-or-discount gift.
//! All randomness happens here, up front, so the storage layer can resolve a
//! [`RewardPlan`] against inventory inside a transaction without touching an
//! RNG, and tests can drive it with a seeded one.
//!
//! Inventory fallbacks during resolution: no active video demotes a video
//! draw to plain points; an empty discount pool turns any discount grant
//! into points. Points can always be credited.

use rand::Rng;
use serde::Serialize;

use crate::types::Points;

/// Primary draw weights. Discount takes the remainder (0.2).
const VIDEO_WEIGHT: f64 = 0.6;
const POINTS_WEIGHT: f64 = 0.2;

/// One of the three reward kinds a gift box can yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Video,
    Points,
    Discount,
}

/// A fully drawn reward: the primary kind, the secondary gift attached to a
/// video, and the point amount should points end up granted anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardPlan {
    pub primary: RewardKind,
    pub secondary: RewardKind,
    pub points: Points,
}

impl RewardPlan {
    /// Draw a plan: 60% video / 20% points / 20% discount primary, an even
    /// points-or-discount secondary, and a point amount in
    /// `1..=max_bonus_point`.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, max_bonus_point: i64) -> Self {
        let primary = match rng.random::<f64>() {
            u if u < VIDEO_WEIGHT => RewardKind::Video,
            u if u < VIDEO_WEIGHT + POINTS_WEIGHT => RewardKind::Points,
            _ => RewardKind::Discount,
        };
        let secondary = if rng.random::<f64>() < 0.5 {
            RewardKind::Points
        } else {
            RewardKind::Discount
        };
        let points = ((rng.random::<f64>() * max_bonus_point as f64).ceil() as i64).max(1);
        RewardPlan {
            primary,
            secondary,
            points,
        }
    }
}
