//! Integration tests for gift box opening: the idempotent milestone claim,
//! inventory fallbacks, and the audit trail. Database-backed; run with
//! `cargo test -- --ignored` against a local PostgreSQL.
//!
//! Plans are fixed per test instead of drawn, so every resolution branch is
//! deterministic.

use sqlx::PgPool;
use strider_core::reward::{RewardKind, RewardPlan};
use strider_db::models::challenge::CreateChallenge;
use strider_db::models::discount::CreateDiscountCode;
use strider_db::models::gift::{CreateGiftVideo, GiftOpening};
use strider_db::models::status::DiscountKind;
use strider_db::models::user::CreateUser;
use strider_db::models::user_challenge::EnrollChallenge;
use strider_db::repositories::point_repo::REASON_GIFT_BOX;
use strider_db::repositories::{
    ChallengeRepo, DiscountCodeRepo, EnrollmentRepo, GiftBoxRepo, GiftOutcome, GiftVideoRepo,
    PointRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

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
        gift_milestones: vec![20, 50, 80],
        discount_amount: None,
        discount_remaining: None,
        discount_from: None,
        discount_to: None,
        submitted_before_day: None,
    }
}

fn new_code(code: &str, uses: i32) -> CreateDiscountCode {
    CreateDiscountCode {
        code: code.to_string(),
        number_of_uses: uses,
        expire_date: None,
        kind_id: DiscountKind::Challenge.id(),
    }
}

fn new_video(title: &str) -> CreateGiftVideo {
    CreateGiftVideo {
        title: title.to_string(),
        url: format!("https://videos.example.com/{title}.mp4"),
    }
}

fn plan(primary: RewardKind, secondary: RewardKind) -> RewardPlan {
    RewardPlan {
        primary,
        secondary,
        points: 25,
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

async fn opening_count(pool: &PgPool, uc_id: i64) -> i64 {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM gift_openings WHERE user_challenge_id = $1")
            .bind(uc_id)
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

// ---------------------------------------------------------------------------
// Test: a discount plan grants a pool code to the user
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_discount_plan_grants_a_pool_code(pool: PgPool) {
    let (user_id, uc_id) = enrollment(&pool, "alice", "ORD-GIFT-1").await;
    DiscountCodeRepo::create(&pool, &new_code("GIFT10", 1)).await.unwrap();

    let outcome = GiftBoxRepo::open(
        &pool,
        user_id,
        uc_id,
        20,
        plan(RewardKind::Discount, RewardKind::Points),
    )
    .await
    .unwrap();
    let GiftOutcome::Opened(reward) = outcome else {
        panic!("expected the box to open");
    };

    assert_eq!(reward.kind, RewardKind::Discount);
    assert!(reward.video.is_none());
    assert!(reward.points.is_none());
    let granted = reward.discount_code.expect("granted code");
    assert_eq!(granted.code, "GIFT10");
    assert_eq!(granted.user_id, user_id);

    // The single use moved out of the pool, and no points were credited.
    assert!(DiscountCodeRepo::find_by_code(&pool, "GIFT10")
        .await
        .unwrap()
        .is_none());
    assert_eq!(PointRepo::balance(&pool, user_id).await.unwrap(), 0);

    // The audit row records what was handed out.
    let opening: GiftOpening = sqlx::query_as(
        "SELECT id, user_id, user_challenge_id, milestone, video_id, points, \
                discount_code, payload, created_at, updated_at \
         FROM gift_openings WHERE user_challenge_id = $1",
    )
    .bind(uc_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(opening.milestone, 20);
    assert!(opening.video_id.is_none());
    assert!(opening.points.is_none());
    assert_eq!(opening.discount_code.as_deref(), Some("GIFT10"));
    assert_eq!(opening.payload["kind"], "discount");
}

// ---------------------------------------------------------------------------
// Test: a discount plan falls back to points when the pool is empty
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_discount_plan_falls_back_to_points_when_the_pool_is_empty(pool: PgPool) {
    let (user_id, uc_id) = enrollment(&pool, "bob", "ORD-GIFT-2").await;

    let outcome = GiftBoxRepo::open(
        &pool,
        user_id,
        uc_id,
        20,
        plan(RewardKind::Discount, RewardKind::Discount),
    )
    .await
    .unwrap();
    let GiftOutcome::Opened(reward) = outcome else {
        panic!("expected the box to open");
    };

    assert_eq!(reward.kind, RewardKind::Points);
    assert_eq!(reward.points, Some(25));
    assert!(reward.discount_code.is_none());

    assert_eq!(PointRepo::balance(&pool, user_id).await.unwrap(), 25);
    let history = PointRepo::history(&pool, user_id, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reason, REASON_GIFT_BOX);
}

// ---------------------------------------------------------------------------
// Test: a video plan without inventory demotes to points
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_video_plan_without_inventory_demotes_to_points(pool: PgPool) {
    let (user_id, uc_id) = enrollment(&pool, "carol", "ORD-GIFT-3").await;

    let outcome = GiftBoxRepo::open(
        &pool,
        user_id,
        uc_id,
        50,
        plan(RewardKind::Video, RewardKind::Discount),
    )
    .await
    .unwrap();
    let GiftOutcome::Opened(reward) = outcome else {
        panic!("expected the box to open");
    };

    assert_eq!(reward.kind, RewardKind::Points);
    assert!(reward.video.is_none());
    assert_eq!(reward.points, Some(25));
    assert_eq!(PointRepo::balance(&pool, user_id).await.unwrap(), 25);
}

// ---------------------------------------------------------------------------
// Test: a video reward carries points as its secondary gift
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_video_reward_carries_points_as_its_secondary_gift(pool: PgPool) {
    let (user_id, uc_id) = enrollment(&pool, "dave", "ORD-GIFT-4").await;
    GiftVideoRepo::create(&pool, &new_video("recovery-stretches")).await.unwrap();

    let outcome = GiftBoxRepo::open(
        &pool,
        user_id,
        uc_id,
        20,
        plan(RewardKind::Video, RewardKind::Points),
    )
    .await
    .unwrap();
    let GiftOutcome::Opened(reward) = outcome else {
        panic!("expected the box to open");
    };

    assert_eq!(reward.kind, RewardKind::Video);
    assert_eq!(
        reward.video.as_ref().map(|v| v.title.as_str()),
        Some("recovery-stretches")
    );
    assert_eq!(reward.points, Some(25));
    assert!(reward.discount_code.is_none());

    // The secondary points land on the balance.
    assert_eq!(PointRepo::balance(&pool, user_id).await.unwrap(), 25);
}

// ---------------------------------------------------------------------------
// Test: a video reward prefers a live discount secondary
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_video_reward_prefers_a_live_discount_secondary(pool: PgPool) {
    let (user_id, uc_id) = enrollment(&pool, "erin", "ORD-GIFT-5").await;
    GiftVideoRepo::create(&pool, &new_video("hill-repeats")).await.unwrap();
    DiscountCodeRepo::create(&pool, &new_code("RUN15", 1)).await.unwrap();

    let outcome = GiftBoxRepo::open(
        &pool,
        user_id,
        uc_id,
        20,
        plan(RewardKind::Video, RewardKind::Discount),
    )
    .await
    .unwrap();
    let GiftOutcome::Opened(reward) = outcome else {
        panic!("expected the box to open");
    };

    assert_eq!(reward.kind, RewardKind::Video);
    assert!(reward.video.is_some());
    assert!(reward.points.is_none());
    assert_eq!(reward.discount_code.map(|c| c.code).as_deref(), Some("RUN15"));

    // Discount instead of points: nothing credited, the pool use consumed.
    assert_eq!(PointRepo::balance(&pool, user_id).await.unwrap(), 0);
    assert!(DiscountCodeRepo::find_by_code(&pool, "RUN15")
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: a milestone opens exactly once
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn test_a_milestone_opens_exactly_once(pool: PgPool) {
    let (user_id, uc_id) = enrollment(&pool, "frank", "ORD-GIFT-6").await;

    let first = GiftBoxRepo::open(
        &pool,
        user_id,
        uc_id,
        20,
        plan(RewardKind::Points, RewardKind::Points),
    )
    .await
    .unwrap();
    assert!(matches!(first, GiftOutcome::Opened(_)));

    let second = GiftBoxRepo::open(
        &pool,
        user_id,
        uc_id,
        20,
        plan(RewardKind::Points, RewardKind::Points),
    )
    .await
    .unwrap();
    assert!(matches!(second, GiftOutcome::AlreadyOpened));

    // The rejected open granted nothing.
    assert_eq!(PointRepo::balance(&pool, user_id).await.unwrap(), 25);
    assert_eq!(opening_count(&pool, uc_id).await, 1);

    // A different milestone is its own box.
    let third = GiftBoxRepo::open(
        &pool,
        user_id,
        uc_id,
        50,
        plan(RewardKind::Points, RewardKind::Points),
    )
    .await
    .unwrap();
    assert!(matches!(third, GiftOutcome::Opened(_)));
    assert_eq!(opening_count(&pool, uc_id).await, 2);
}
