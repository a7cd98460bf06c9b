//! Gift box opening: where a drawn reward plan meets inventory.
//!
//! The open is one transaction: a guarded array append claims the milestone
//! (making the whole operation idempotent per box), the plan is resolved
//! against video/discount inventory with point fallbacks, and an audit row
//! records exactly what the client was told.

use sqlx::{PgConnection, PgPool};
use strider_core::reward::{RewardKind, RewardPlan};
use strider_core::types::DbId;

use crate::models::gift::ResolvedReward;
use crate::repositories::discount_code_repo::DiscountCodeRepo;
use crate::repositories::gift_video_repo::GiftVideoRepo;
use crate::repositories::point_repo::{PointRepo, REASON_GIFT_BOX};

/// Result of an open attempt.
#[derive(Debug)]
pub enum GiftOutcome {
    Opened(ResolvedReward),
    /// The milestone was already claimed for this enrollment; nothing was
    /// granted or written.
    AlreadyOpened,
}

pub struct GiftBoxRepo;

impl GiftBoxRepo {
    /// Open the gift box for `milestone` and resolve `plan` into a concrete
    /// reward. Callers validate reachability first; this method only guards
    /// the claim itself.
    pub async fn open(
        pool: &PgPool,
        user_id: DbId,
        user_challenge_id: DbId,
        milestone: i64,
        plan: RewardPlan,
    ) -> Result<GiftOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Claim the milestone. 0 rows means it is already in the array.
        let claimed = sqlx::query(
            "UPDATE user_challenges \
             SET opened_milestones = array_append(opened_milestones, $2) \
             WHERE id = $1 AND NOT ($2 = ANY(opened_milestones))",
        )
        .bind(user_challenge_id)
        .bind(milestone)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(GiftOutcome::AlreadyOpened);
        }

        let reward = Self::resolve_in_tx(&mut *tx, user_id, plan).await?;

        let payload = serde_json::to_value(&reward).unwrap_or_default();
        sqlx::query(
            "INSERT INTO gift_openings \
                (user_id, user_challenge_id, milestone, video_id, points, discount_code, payload) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user_id)
        .bind(user_challenge_id)
        .bind(milestone)
        .bind(reward.video.as_ref().map(|v| v.id))
        .bind(reward.points)
        .bind(reward.discount_code.as_ref().map(|c| c.code.as_str()))
        .bind(&payload)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(GiftOutcome::Opened(reward))
    }

    /// Apply the plan's fallback rules against live inventory.
    async fn resolve_in_tx(
        conn: &mut PgConnection,
        user_id: DbId,
        plan: RewardPlan,
    ) -> Result<ResolvedReward, sqlx::Error> {
        match plan.primary {
            RewardKind::Video => {
                let Some(video) = GiftVideoRepo::random_active_in_tx(conn).await? else {
                    // No video inventory left: demote to plain points.
                    return Self::points_reward(conn, user_id, plan.points).await;
                };
                let secondary = Self::discount_or_points_in_tx(conn, user_id, plan).await?;
                Ok(ResolvedReward {
                    kind: RewardKind::Video,
                    video: Some(video),
                    points: secondary.points,
                    discount_code: secondary.discount_code,
                })
            }
            RewardKind::Points => Self::points_reward(conn, user_id, plan.points).await,
            RewardKind::Discount => {
                if let Some(code) = DiscountCodeRepo::draw_random_in_tx(conn).await? {
                    let granted =
                        DiscountCodeRepo::grant_to_user_in_tx(conn, user_id, &code).await?;
                    Ok(ResolvedReward {
                        kind: RewardKind::Discount,
                        video: None,
                        points: None,
                        discount_code: Some(granted),
                    })
                } else {
                    Self::points_reward(conn, user_id, plan.points).await
                }
            }
        }
    }

    /// The secondary gift attached to a video: discount when drawn and
    /// available, points otherwise.
    async fn discount_or_points_in_tx(
        conn: &mut PgConnection,
        user_id: DbId,
        plan: RewardPlan,
    ) -> Result<ResolvedReward, sqlx::Error> {
        if plan.secondary == RewardKind::Discount {
            if let Some(code) = DiscountCodeRepo::draw_random_in_tx(conn).await? {
                let granted = DiscountCodeRepo::grant_to_user_in_tx(conn, user_id, &code).await?;
                return Ok(ResolvedReward {
                    kind: RewardKind::Discount,
                    video: None,
                    points: None,
                    discount_code: Some(granted),
                });
            }
        }
        Self::points_reward(conn, user_id, plan.points).await
    }

    async fn points_reward(
        conn: &mut PgConnection,
        user_id: DbId,
        points: i64,
    ) -> Result<ResolvedReward, sqlx::Error> {
        PointRepo::credit_in_tx(conn, user_id, points, REASON_GIFT_BOX).await?;
        Ok(ResolvedReward {
            kind: RewardKind::Points,
            video: None,
            points: Some(points),
            discount_code: None,
        })
    }
}
