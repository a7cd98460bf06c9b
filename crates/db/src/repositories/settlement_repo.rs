//! Settlement: the single transaction that makes a confirmed payment
//! durable.
//!
//! Gateway confirmation happens before any of this runs; no locks are ever
//! held across the network. Inside the transaction the target row is locked
//! by order_id, the already-settled case short-circuits to a no-op success,
//! and the fan-out (ledger upsert, enrollment window, referral bonus,
//! discount consumption, card token) commits or rolls back as a unit.

use sqlx::PgPool;
use strider_core::challenge::ChallengeWindow;
use strider_core::types::Timestamp;

use crate::models::card_link::CreateCardLink;
use crate::models::delivery::Delivery;
use crate::models::payment::PaymentAmounts;
use crate::models::status::{DeliveryStatus, PaidType};
use crate::models::user_challenge::UserChallenge;
use crate::repositories::card_link_repo::CardLinkRepo;
use crate::repositories::challenge_repo::ChallengeRepo;
use crate::repositories::delivery_repo::DeliveryRepo;
use crate::repositories::discount_code_repo::DiscountCodeRepo;
use crate::repositories::enrollment_repo::EnrollmentRepo;
use crate::repositories::payment_history_repo::{PaymentHistoryRepo, RecordPayment};
use crate::repositories::point_repo::{PointRepo, REASON_REFERRAL_BONUS};
use crate::repositories::user_repo::UserRepo;

/// How a settlement attempt ended.
#[derive(Debug)]
pub enum SettlementOutcome<T> {
    /// This attempt made the payment durable.
    Settled(T),
    /// A previous attempt already did; nothing was written.
    AlreadySettled(T),
    /// No row matches the order_id.
    TargetNotFound,
    /// The target exists but is in a state that cannot be settled.
    NotSettleable,
}

/// Inputs for settling a challenge enrollment.
#[derive(Debug)]
pub struct SettleChallenge<'a> {
    pub order_id: &'a str,
    pub paid_type: PaidType,
    pub amounts: PaymentAmounts,
    /// Raw gateway response, appended verbatim to the ledger.
    pub gateway_payload: serde_json::Value,
    /// Code supplied with the payment, to be consumed from the pool.
    pub discount_code: Option<&'a str>,
    /// Card token returned by the gateway, if any.
    pub card: Option<&'a CreateCardLink>,
    /// Fixed referral bonus from configuration.
    pub referral_bonus: i64,
    pub now: Timestamp,
}

/// Inputs for settling a product delivery (webhook path).
#[derive(Debug)]
pub struct SettleDelivery<'a> {
    pub order_id: &'a str,
    pub paid_type: PaidType,
    pub amounts: PaymentAmounts,
    pub gateway_payload: serde_json::Value,
}

/// The settlement fan-out.
pub struct SettlementRepo;

impl SettlementRepo {
    /// Settle the enrollment identified by `order_id`.
    pub async fn settle_challenge(
        pool: &PgPool,
        params: SettleChallenge<'_>,
    ) -> Result<SettlementOutcome<UserChallenge>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(uc) = EnrollmentRepo::lock_by_order_id_in_tx(&mut *tx, params.order_id).await?
        else {
            tx.rollback().await?;
            return Ok(SettlementOutcome::TargetNotFound);
        };
        if uc.is_paid {
            tx.rollback().await?;
            tracing::info!(order_id = params.order_id, "order already settled, skipping");
            return Ok(SettlementOutcome::AlreadySettled(uc));
        }

        let Some(challenge) = ChallengeRepo::lock_by_id_in_tx(&mut *tx, uc.challenge_id).await?
        else {
            tx.rollback().await?;
            return Ok(SettlementOutcome::TargetNotFound);
        };

        PaymentHistoryRepo::record_settled_in_tx(
            &mut *tx,
            &RecordPayment {
                order_id: params.order_id,
                user_id: uc.user_id,
                challenge_id: Some(challenge.id),
                user_challenge_id: Some(uc.id),
                delivery_id: None,
                paid_type: params.paid_type,
                amounts: params.amounts,
                gateway_payload: params.gateway_payload.clone(),
            },
        )
        .await?;

        let window = ChallengeWindow::starting_tomorrow(params.now, challenge.total_date as u32);
        let settled = EnrollmentRepo::settle_in_tx(&mut *tx, uc.id, params.paid_type, &window).await?;

        // Referral bonus, one shot per settling user.
        if let Some(code) = uc.referral_code.as_deref() {
            if let Some(user) = UserRepo::lock_by_id_in_tx(&mut *tx, uc.user_id).await? {
                if !user.referral_redeemed {
                    if let Some(owner) =
                        UserRepo::find_by_referral_code_in_tx(&mut *tx, code).await?
                    {
                        if owner.id != user.id {
                            PointRepo::credit_in_tx(
                                &mut *tx,
                                owner.id,
                                params.referral_bonus,
                                REASON_REFERRAL_BONUS,
                            )
                            .await?;
                            UserRepo::mark_referral_redeemed_in_tx(&mut *tx, user.id).await?;
                            tracing::info!(
                                order_id = params.order_id,
                                referrer_id = owner.id,
                                "referral bonus credited"
                            );
                        }
                    }
                }
            }
        }

        // Early-bird discount window on the template.
        if ChallengeRepo::consume_discount_in_tx(&mut *tx, challenge.id, params.now).await? {
            tracing::debug!(challenge_id = challenge.id, "challenge discount use consumed");
        }

        // Discount code supplied with the payment.
        if let Some(code) = params.discount_code {
            if DiscountCodeRepo::consume_in_tx(&mut *tx, code).await?.is_none() {
                tracing::warn!(
                    order_id = params.order_id,
                    code,
                    "discount code vanished before consumption"
                );
            }
        }

        // Card token returned by the gateway.
        if let Some(card) = params.card {
            CardLinkRepo::insert_in_tx(&mut *tx, uc.user_id, card).await?;
        }

        tx.commit().await?;
        tracing::info!(
            order_id = params.order_id,
            user_challenge_id = settled.id,
            "challenge settled"
        );
        Ok(SettlementOutcome::Settled(settled))
    }

    /// Settle the delivery identified by `order_id` (webhook path).
    pub async fn settle_delivery(
        pool: &PgPool,
        params: SettleDelivery<'_>,
    ) -> Result<SettlementOutcome<Delivery>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(delivery) =
            DeliveryRepo::lock_by_order_id_in_tx(&mut *tx, params.order_id).await?
        else {
            tx.rollback().await?;
            return Ok(SettlementOutcome::TargetNotFound);
        };
        if delivery.status_id == DeliveryStatus::Paid.id() {
            tx.rollback().await?;
            tracing::info!(order_id = params.order_id, "delivery already paid, skipping");
            return Ok(SettlementOutcome::AlreadySettled(delivery));
        }

        PaymentHistoryRepo::record_settled_in_tx(
            &mut *tx,
            &RecordPayment {
                order_id: params.order_id,
                user_id: delivery.user_id,
                challenge_id: None,
                user_challenge_id: None,
                delivery_id: Some(delivery.id),
                paid_type: params.paid_type,
                amounts: params.amounts,
                gateway_payload: params.gateway_payload.clone(),
            },
        )
        .await?;

        let Some(paid) = DeliveryRepo::mark_paid_in_tx(&mut *tx, delivery.id).await? else {
            // Cancelled rows stay cancelled.
            tx.rollback().await?;
            return Ok(SettlementOutcome::NotSettleable);
        };

        tx.commit().await?;
        tracing::info!(order_id = params.order_id, delivery_id = paid.id, "delivery settled");
        Ok(SettlementOutcome::Settled(paid))
    }
}
