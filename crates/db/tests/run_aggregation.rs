//! Integration tests for daily run submissions and distance aggregation.
//! Database-backed; run with `cargo test -- --ignored` against a local
//! PostgreSQL.

use chrono::NaiveDate;
use sqlx::PgPool;
use strider_db::models::challenge::CreateChallenge;
use strider_db::models::user::CreateUser;
use strider_db::models::user_challenge::EnrollChallenge;
use strider_db::repositories::{ChallengeRepo, EnrollmentRepo, RunHistoryRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const MILESTONES: &[i64] = &[20, 50, 80];

fn new_user(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        referral_code: format!("{username}-ref"),
    }
}

fn new_challenge() -> CreateChallenge {
    CreateChallenge {
        title: "Spring 100".to_string(),
        total_date: 30,
        total_run: 100.0,
        price: 200_000,
        gift_milestones: MILESTONES.to_vec(),
        discount_amount: None,
        discount_remaining: None,
        discount_from: None,
        discount_to: None,
        submitted_before_day: None,
    }
}

/// Create a user, a challenge, and a current enrollment; returns
/// `(user_id, user_challenge_id)`.
async fn enrollment(pool: &PgPool, username: &str, order_id: &str) -> (i64, i64) {
    let user = UserRepo::create(pool, &new_user(username)).await.unwrap();
    let challenge = ChallengeRepo::create(pool, &new_challenge()).await.unwrap();
    let uc = EnrollmentRepo::create_current(
        pool,
        user.id,
        &challenge,
        &EnrollChallenge {
            challenge_id: challenge.id,
            group_id: None,
            paid_type: None,
            order_id: order_id.to_string(),
            referral_code: None,
        },
    )
    .await
    .unwrap();
    (user.id, uc.id)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
}

// ---------------------------------------------------------------------------
// Test: resubmitting the same day replaces the distance
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_same_day_resubmission_replaces_the_distance(pool: PgPool) {
    let (_, uc_id) = enrollment(&pool, "alice", "ORD-RUN-1").await;

    let (row, total, reached) = RunHistoryRepo::submit_day(&pool, uc_id, day(1), 10.0, MILESTONES)
        .await
        .unwrap();
    assert_eq!(row.total_run, 10.0);
    assert_eq!(total, 10.0);
    assert_eq!(reached, 0);

    // Same day again: the value is replaced, never added.
    let (row, total, reached) = RunHistoryRepo::submit_day(&pool, uc_id, day(1), 25.0, MILESTONES)
        .await
        .unwrap();
    assert_eq!(row.total_run, 25.0);
    assert_eq!(total, 25.0);
    assert_eq!(reached, 20);

    let days = RunHistoryRepo::list_days(&pool, uc_id).await.unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].run_date, day(1));
}

// ---------------------------------------------------------------------------
// Test: distances accumulate across days
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_distances_accumulate_across_days(pool: PgPool) {
    let (_, uc_id) = enrollment(&pool, "bob", "ORD-RUN-2").await;

    RunHistoryRepo::submit_day(&pool, uc_id, day(1), 30.0, MILESTONES)
        .await
        .unwrap();
    let (_, total, reached) = RunHistoryRepo::submit_day(&pool, uc_id, day(2), 25.5, MILESTONES)
        .await
        .unwrap();
    assert_eq!(total, 55.5);
    assert_eq!(reached, 50);
    assert_eq!(RunHistoryRepo::total_run(&pool, uc_id).await.unwrap(), 55.5);

    let days = RunHistoryRepo::list_days(&pool, uc_id).await.unwrap();
    assert_eq!(days.len(), 2);
    assert!(days[0].run_date < days[1].run_date, "days come back in date order");
}

// ---------------------------------------------------------------------------
// Test: each submission refreshes the enrollment's reached milestone
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_submission_updates_the_reached_milestone(pool: PgPool) {
    let (user_id, uc_id) = enrollment(&pool, "carol", "ORD-RUN-3").await;

    RunHistoryRepo::submit_day(&pool, uc_id, day(1), 60.0, MILESTONES)
        .await
        .unwrap();
    let current = EnrollmentRepo::find_current(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(current.current_gift_milestone, 50);

    RunHistoryRepo::submit_day(&pool, uc_id, day(2), 30.0, MILESTONES)
        .await
        .unwrap();
    let current = EnrollmentRepo::find_current(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(current.current_gift_milestone, 80);
}

// ---------------------------------------------------------------------------
// Test: windowed totals include both endpoints
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_windowed_total_includes_both_endpoints(pool: PgPool) {
    let (_, uc_id) = enrollment(&pool, "dave", "ORD-RUN-4").await;

    RunHistoryRepo::submit_day(&pool, uc_id, day(1), 10.0, MILESTONES)
        .await
        .unwrap();
    RunHistoryRepo::submit_day(&pool, uc_id, day(3), 20.0, MILESTONES)
        .await
        .unwrap();
    RunHistoryRepo::submit_day(&pool, uc_id, day(5), 30.0, MILESTONES)
        .await
        .unwrap();

    let between = RunHistoryRepo::total_run_between(&pool, uc_id, day(1), day(3))
        .await
        .unwrap();
    assert_eq!(between, 30.0);

    let inner = RunHistoryRepo::total_run_between(&pool, uc_id, day(2), day(4))
        .await
        .unwrap();
    assert_eq!(inner, 20.0);

    let empty = RunHistoryRepo::total_run_between(&pool, uc_id, day(4), day(4))
        .await
        .unwrap();
    assert_eq!(empty, 0.0);

    let all = RunHistoryRepo::total_run_between(&pool, uc_id, day(1), day(5))
        .await
        .unwrap();
    assert_eq!(all, 60.0);
}

// ---------------------------------------------------------------------------
// Test: totals of an enrollment without submissions are zero
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_totals_without_submissions_are_zero(pool: PgPool) {
    let (_, uc_id) = enrollment(&pool, "erin", "ORD-RUN-5").await;

    assert_eq!(RunHistoryRepo::total_run(&pool, uc_id).await.unwrap(), 0.0);
    assert!(RunHistoryRepo::list_days(&pool, uc_id).await.unwrap().is_empty());
}
