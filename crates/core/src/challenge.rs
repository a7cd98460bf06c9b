//! Challenge window math and lifecycle decisions.
//!
//! A challenge runs over whole calendar days (UTC): payment on day D opens a
//! window starting day D+1 at 00:00:00 and ending day D+`total_date` at
//! 23:59:59. All decisions here are pure functions over loaded values so the
//! repository layer can apply them inside its transactions.

use chrono::{Days, NaiveTime};

use crate::error::{CoreError, StateCode};
use crate::types::{Points, Timestamp};

/// Points credited per target kilometre when a challenge completes.
pub const POINTS_PER_TARGET_KM: i64 = 100;

/// The active date window of a paid challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl ChallengeWindow {
    /// Compute the window opened by a settlement at `now`.
    ///
    /// `start` is the next calendar day at 00:00:00; `end` is the last of the
    /// `total_date` challenge days at 23:59:59, i.e. day `now + total_date`.
    pub fn starting_tomorrow(now: Timestamp, total_date: u32) -> Self {
        let first_day = now
            .date_naive()
            .checked_add_days(Days::new(1))
            .expect("challenge start date within chrono range");
        let last_day = first_day
            .checked_add_days(Days::new(u64::from(total_date.saturating_sub(1))))
            .expect("challenge end date within chrono range");

        let midnight = NaiveTime::from_hms_opt(0, 0, 0).expect("midnight is a valid time");
        let day_end = NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid time");

        ChallengeWindow {
            start: first_day.and_time(midnight).and_utc(),
            end: last_day.and_time(day_end).and_utc(),
        }
    }

    /// Reject run submissions outside `[start, end]` with the typed state
    /// errors the mobile clients branch on.
    pub fn check_submit(&self, now: Timestamp) -> Result<(), CoreError> {
        if now < self.start {
            return Err(CoreError::state(
                StateCode::ErrorStartDate,
                "challenge has not started yet",
            ));
        }
        if now > self.end {
            return Err(CoreError::state(
                StateCode::ErrorEndDate,
                "challenge has already ended",
            ));
        }
        Ok(())
    }
}

/// What `enroll` should do given the user's existing current challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentAction {
    /// No current challenge: insert a fresh unpaid row.
    Insert,
    /// An unpaid current challenge exists: overwrite it (retry before payment).
    Overwrite,
}

/// Decide how an enrollment request is applied.
///
/// `existing_paid` is the `is_paid` flag of the user's current challenge, if
/// one exists. A paid current challenge blocks new enrollment entirely.
pub fn enrollment_action(existing_paid: Option<bool>) -> Result<EnrollmentAction, CoreError> {
    match existing_paid {
        None => Ok(EnrollmentAction::Insert),
        Some(false) => Ok(EnrollmentAction::Overwrite),
        Some(true) => Err(CoreError::state(
            StateCode::ChallengeActive,
            "complete the current challenge before starting a new one",
        )),
    }
}

/// Outcome of evaluating a running challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// Window still open and target not reached: nothing to finalize.
    StillRunning,
    /// Target distance reached: finalize as completed.
    Completed,
    /// Window elapsed without reaching the target: finalize as not completed.
    NotCompleted,
}

/// Decide whether a CreateNew challenge can be finalized.
///
/// Reaching the target finalizes immediately; falling short only finalizes
/// once the window has elapsed. Terminal rows must not be re-evaluated --
/// callers guard the transition on the stored status.
pub fn evaluate(now: Timestamp, end: Timestamp, total_done: f64, target: f64) -> EvaluationOutcome {
    if total_done >= target {
        EvaluationOutcome::Completed
    } else if now > end {
        EvaluationOutcome::NotCompleted
    } else {
        EvaluationOutcome::StillRunning
    }
}

/// One-shot point award for a completed challenge: the enrollment price plus
/// [`POINTS_PER_TARGET_KM`] per target kilometre.
pub fn completion_points(price: i64, target: f64) -> Points {
    price + (target * POINTS_PER_TARGET_KM as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn window_starts_next_day_at_midnight() {
        let now = at(2026, 3, 10, 14, 30, 0);
        let window = ChallengeWindow::starting_tomorrow(now, 30);
        assert_eq!(window.start, at(2026, 3, 11, 0, 0, 0));
    }

    #[test]
    fn window_ends_total_date_days_out_at_day_end() {
        // Paying on March 10 with a 30-day challenge ends April 9 23:59:59,
        // i.e. today + 30 days.
        let now = at(2026, 3, 10, 14, 30, 0);
        let window = ChallengeWindow::starting_tomorrow(now, 30);
        assert_eq!(window.end, at(2026, 4, 9, 23, 59, 59));
    }

    #[test]
    fn one_day_window_starts_and_ends_on_the_same_day() {
        let now = at(2026, 3, 10, 9, 0, 0);
        let window = ChallengeWindow::starting_tomorrow(now, 1);
        assert_eq!(window.start, at(2026, 3, 11, 0, 0, 0));
        assert_eq!(window.end, at(2026, 3, 11, 23, 59, 59));
    }

    #[test]
    fn submit_before_start_is_rejected_with_start_code() {
        let window = ChallengeWindow {
            start: at(2026, 3, 11, 0, 0, 0),
            end: at(2026, 4, 9, 23, 59, 59),
        };
        let err = window.check_submit(at(2026, 3, 10, 23, 0, 0)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::State {
                code: StateCode::ErrorStartDate,
                ..
            }
        ));
    }

    #[test]
    fn submit_after_end_is_rejected_with_end_code() {
        let window = ChallengeWindow {
            start: at(2026, 3, 11, 0, 0, 0),
            end: at(2026, 4, 9, 23, 59, 59),
        };
        let err = window.check_submit(at(2026, 4, 10, 0, 0, 0)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::State {
                code: StateCode::ErrorEndDate,
                ..
            }
        ));
    }

    #[test]
    fn submit_inside_window_is_accepted() {
        let window = ChallengeWindow {
            start: at(2026, 3, 11, 0, 0, 0),
            end: at(2026, 4, 9, 23, 59, 59),
        };
        assert!(window.check_submit(at(2026, 3, 11, 0, 0, 0)).is_ok());
        assert!(window.check_submit(at(2026, 4, 9, 23, 59, 59)).is_ok());
    }

    #[test]
    fn enrollment_with_no_current_challenge_inserts() {
        assert_eq!(enrollment_action(None).unwrap(), EnrollmentAction::Insert);
    }

    #[test]
    fn enrollment_over_unpaid_challenge_overwrites() {
        assert_eq!(
            enrollment_action(Some(false)).unwrap(),
            EnrollmentAction::Overwrite
        );
    }

    #[test]
    fn enrollment_over_paid_challenge_is_rejected() {
        let err = enrollment_action(Some(true)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::State {
                code: StateCode::ChallengeActive,
                ..
            }
        ));
    }

    #[test]
    fn evaluation_completes_once_target_reached() {
        let end = at(2026, 4, 9, 23, 59, 59);
        // Even before the window closes.
        let now = at(2026, 3, 20, 12, 0, 0);
        assert_eq!(evaluate(now, end, 100.0, 100.0), EvaluationOutcome::Completed);
        assert_eq!(evaluate(now, end, 120.5, 100.0), EvaluationOutcome::Completed);
    }

    #[test]
    fn evaluation_stays_running_inside_window() {
        let end = at(2026, 4, 9, 23, 59, 59);
        let now = at(2026, 3, 20, 12, 0, 0);
        assert_eq!(
            evaluate(now, end, 40.0, 100.0),
            EvaluationOutcome::StillRunning
        );
    }

    #[test]
    fn evaluation_fails_after_window_without_target() {
        let end = at(2026, 4, 9, 23, 59, 59);
        let now = at(2026, 4, 10, 0, 0, 0);
        assert_eq!(
            evaluate(now, end, 99.9, 100.0),
            EvaluationOutcome::NotCompleted
        );
    }

    #[test]
    fn completion_points_add_hundred_per_target_km() {
        assert_eq!(completion_points(200_000, 100.0), 210_000);
        assert_eq!(completion_points(0, 42.0), 4_200);
    }
}
