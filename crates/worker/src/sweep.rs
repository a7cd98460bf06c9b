//! Enrollment evaluation sweep.
//!
//! [`EvaluationSweep`] runs as a background task, periodically finalizing
//! paid enrollments whose challenge window has closed. Finalization normally
//! happens lazily when the owner next fetches their progress; the sweep
//! catches enrollments nobody looks at again, so completion bonuses are
//! still credited without a read.

use std::time::Duration;

use chrono::Utc;
use strider_db::models::status::UserChallengeStatus;
use strider_db::repositories::EnrollmentRepo;
use strider_db::DbPool;
use tokio_util::sync::CancellationToken;

/// Default time between sweep passes: 5 minutes.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// How many due enrollments a single pass picks up.
const SWEEP_BATCH_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// EvaluationSweep
// ---------------------------------------------------------------------------

/// Background service that finalizes expired enrollments in batches.
pub struct EvaluationSweep {
    pool: DbPool,
}

impl EvaluationSweep {
    /// Create a new sweep over the given database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the sweep loop.
    ///
    /// Polls every `SWEEP_INTERVAL_SECS` seconds (defaults to 300) for paid
    /// enrollments past their end date. The loop exits gracefully when the
    /// provided [`CancellationToken`] is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

        tracing::info!(interval_secs, "Evaluation sweep started");

        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Evaluation sweep stopping");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        tracing::error!(error = %e, "Evaluation sweep pass failed");
                    }
                }
            }
        }
    }

    /// Run a single sweep pass, finalizing one batch of due enrollments.
    ///
    /// Each enrollment is finalized independently; a failure on one row is
    /// logged and does not abort the rest of the batch.
    pub async fn sweep_once(&self) -> Result<(), sqlx::Error> {
        let now = Utc::now();
        let due = EnrollmentRepo::list_due_for_evaluation(&self.pool, now, SWEEP_BATCH_SIZE).await?;

        if due.is_empty() {
            tracing::debug!("Evaluation sweep: nothing due");
            return Ok(());
        }

        let mut finalized = 0usize;
        for uc in &due {
            match EnrollmentRepo::finalize_if_due(&self.pool, uc.id, now).await {
                Ok(Some(updated)) => {
                    finalized += 1;
                    tracing::info!(
                        user_challenge_id = updated.id,
                        user_id = updated.user_id,
                        completed = updated.status_id == UserChallengeStatus::Completed.id(),
                        "Enrollment finalized"
                    );
                }
                // A lazy progress read or a concurrent sweep got there first.
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(
                        user_challenge_id = uc.id,
                        error = %e,
                        "Failed to finalize enrollment"
                    );
                }
            }
        }

        tracing::info!(due = due.len(), finalized, "Evaluation sweep pass complete");

        Ok(())
    }
}
