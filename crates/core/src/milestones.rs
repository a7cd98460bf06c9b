//! Milestone gift rules.
//!
//! Each challenge carries an ascending list of distance milestones; crossing
//! one lets the runner open a gift box exactly once. The cumulative distance
//! is a sum of per-day values, so the reached milestone only ever moves
//! forward. `current` below is the persisted highest reached milestone,
//! with 0 meaning none.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{CoreError, StateCode};

/// Reached/opened flags for one milestone, as shown on the progress screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MilestoneState {
    pub milestone: i64,
    pub reached: bool,
    pub opened: bool,
}

/// Unopened milestones first crossed on one day of the challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayMilestones {
    pub run_date: NaiveDate,
    pub milestones: Vec<i64>,
}

/// The highest milestone covered by `total` kilometres, 0 when none.
pub fn highest_reached(milestones: &[i64], total: f64) -> i64 {
    milestones
        .iter()
        .copied()
        .filter(|m| (*m as f64) <= total)
        .max()
        .unwrap_or(0)
}

/// Per-milestone state for a progress view.
pub fn milestone_states(milestones: &[i64], opened: &[i64], current: i64) -> Vec<MilestoneState> {
    milestones
        .iter()
        .map(|&m| MilestoneState {
            milestone: m,
            reached: m <= current,
            opened: opened.contains(&m),
        })
        .collect()
}

/// Attribute each still-unopened milestone to the day its threshold was first
/// crossed. `daily` must be ordered by date ascending and hold one value per
/// day (the day's total, not a delta).
pub fn chart(
    milestones: &[i64],
    opened: &[i64],
    daily: &[(NaiveDate, f64)],
) -> Vec<DayMilestones> {
    let mut cumulative = 0.0_f64;
    daily
        .iter()
        .map(|&(run_date, run)| {
            let before = cumulative;
            cumulative += run;
            let crossed = milestones
                .iter()
                .copied()
                .filter(|&m| {
                    let m = m as f64;
                    m > before && m <= cumulative
                })
                .filter(|m| !opened.contains(m))
                .collect();
            DayMilestones {
                run_date,
                milestones: crossed,
            }
        })
        .collect()
}

/// Validate a gift box open request.
///
/// The milestone must belong to the challenge, be covered by the persisted
/// reached milestone, and not have been opened before. The storage layer
/// still guards the opened list on write; this check only orders the
/// client-facing errors.
pub fn check_open(
    milestones: &[i64],
    opened: &[i64],
    milestone: i64,
    current: i64,
) -> Result<(), CoreError> {
    if !milestones.contains(&milestone) {
        return Err(CoreError::state(
            StateCode::GiftUnknownMilestone,
            "milestone does not belong to this challenge",
        ));
    }
    if milestone > current {
        return Err(CoreError::state(
            StateCode::GiftNotReached,
            "milestone distance not reached yet",
        ));
    }
    if opened.contains(&milestone) {
        return Err(CoreError::state(
            StateCode::GiftAlreadyOpened,
            "gift box already opened",
        ));
    }
    Ok(())
}
