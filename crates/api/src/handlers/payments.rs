//! Handlers for the `/payments` resource: enrollment creation, client
//! payment confirmation, and the Alepay server-to-server webhook.
//!
//! The confirm paths follow one rule everywhere: gateway traffic completes
//! before the settlement transaction opens, and retrying a settled order is
//! a success, not an error.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use strider_core::challenge::{self, EnrollmentAction};
use strider_core::error::{CoreError, StateCode};
use strider_db::models::card_link::CreateCardLink;
use strider_db::models::payment::PaymentAmounts;
use strider_db::models::status::{PaidType, StatusId};
use strider_db::models::user_challenge::{EnrollChallenge, UserChallenge};
use strider_db::repositories::{
    ChallengeRepo, EnrollmentRepo, PaymentHistoryRepo, RecordPayment, SettleChallenge,
    SettleDelivery, SettlementOutcome, SettlementRepo,
};
use strider_gateway::alepay::AlepayCallback;
use strider_gateway::momo::MomoPayment;
use strider_gateway::GatewayError;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Encrypted request body: `data` is the sealed enrollment payload.
#[derive(Debug, Deserialize)]
pub struct SealedRequest {
    pub data: String,
}

/// Momo branch of a confirm request, as reported by the paying device.
#[derive(Debug, Deserialize)]
pub struct MomoConfirm {
    pub order_id: String,
    /// Partner code echoed by the client; signing always uses ours.
    #[serde(default)]
    pub partner_code: Option<String>,
    pub amount: i64,
    pub phone_number: String,
    /// Opaque app token produced by the Momo SDK.
    pub data: String,
}

/// Body of `PUT /payments/challenge/confirm`.
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub paid_type: StatusId,
    #[serde(default)]
    pub momo: Option<MomoConfirm>,
    #[serde(default)]
    pub alepay: Option<AlepayCallback>,
    #[serde(flatten)]
    pub amounts: PaymentAmounts,
    #[serde(default)]
    pub discount_code: Option<String>,
}

/// Body of the Alepay webhook.
#[derive(Debug, Deserialize)]
pub struct AlepayWebhookRequest {
    pub check_key: String,
    /// base64-encoded JSON callback.
    pub data: String,
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/payments/challenge/create
///
/// Decrypt the enrollment envelope and create or refresh the caller's
/// unpaid current challenge. Returns 201 on a fresh enrollment and 200
/// when an unpaid one was overwritten; a paid current challenge rejects
/// with `CHALLENGE_ACTIVE`.
pub async fn create_challenge_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<SealedRequest>,
) -> AppResult<impl IntoResponse> {
    // 1. Open the envelope and parse the enrollment payload.
    let plaintext = state.envelope.open(&body.data)?;
    let input: EnrollChallenge = serde_json::from_str(&plaintext)
        .map_err(|e| AppError::BadRequest(format!("Invalid enrollment payload: {e}")))?;

    if input.order_id.trim().is_empty() {
        return Err(CoreError::Validation("order_id is required".into()).into());
    }
    if let Some(paid_type) = input.paid_type {
        if PaidType::from_id(paid_type).is_none() {
            return Err(CoreError::Validation(format!("unknown paid_type {paid_type}")).into());
        }
    }

    // 2. The challenge template must exist.
    let challenge = ChallengeRepo::find_by_id(&state.pool, input.challenge_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Challenge",
            key: input.challenge_id.to_string(),
        }))?;

    // 3. Apply the single-active-challenge rule.
    let existing = EnrollmentRepo::find_current(&state.pool, auth.user_id).await?;
    let action = challenge::enrollment_action(existing.as_ref().map(|uc| uc.is_paid))?;

    let (status, uc) = match action {
        EnrollmentAction::Insert => (
            StatusCode::CREATED,
            EnrollmentRepo::create_current(&state.pool, auth.user_id, &challenge, &input).await?,
        ),
        EnrollmentAction::Overwrite => {
            let current = existing.ok_or_else(|| {
                AppError::InternalError("overwrite action without a current challenge".into())
            })?;
            let Some(uc) =
                EnrollmentRepo::overwrite_current(&state.pool, current.id, &challenge, &input)
                    .await?
            else {
                // The row was settled between the read and the update.
                return Err(CoreError::state(
                    StateCode::ChallengeActive,
                    "complete the current challenge before starting a new one",
                )
                .into());
            };
            (StatusCode::OK, uc)
        }
    };

    tracing::info!(
        user_id = auth.user_id,
        challenge_id = challenge.id,
        order_id = %uc.order_id,
        "challenge enrollment recorded",
    );

    Ok((status, Json(DataResponse { data: uc })))
}

// ---------------------------------------------------------------------------
// Confirm (client path)
// ---------------------------------------------------------------------------

/// PUT /api/v1/payments/challenge/confirm
///
/// Confirm a pending enrollment payment with its gateway and settle it:
/// ledger upsert, window opening, referral bonus, discount consumption,
/// and card-token persistence in one transaction. Confirming a settled
/// order again succeeds without calling the gateway.
pub async fn confirm_challenge_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ConfirmPaymentRequest>,
) -> AppResult<impl IntoResponse> {
    let paid_type = PaidType::from_id(body.paid_type).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "unknown paid_type {}",
            body.paid_type
        )))
    })?;

    // 1. Pull the order id from the selected gateway's branch.
    let order_id = match paid_type {
        PaidType::Momo => body.momo.as_ref().map(|m| m.order_id.as_str()),
        PaidType::Alepay => body.alepay.as_ref().map(|a| a.order_code.as_str()),
    }
    .ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "payload for the selected gateway is required".into(),
        ))
    })?
    .to_string();

    // 2. The order must belong to the caller; foreign and unknown orders
    //    look the same to the client.
    let uc = EnrollmentRepo::find_by_order_id(&state.pool, &order_id)
        .await?
        .filter(|uc| uc.user_id == auth.user_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Order",
            key: order_id.clone(),
        }))?;

    // 3. Already settled: succeed without touching the gateway again.
    if uc.is_paid {
        tracing::info!(order_id = %order_id, "order already settled, skipping gateway call");
        return Ok(Json(MessageResponse {
            message: "Payment already confirmed",
            data: uc,
        }));
    }

    // 4. Gateway confirmation, strictly before the settlement transaction.
    let (gateway_payload, card) = match paid_type {
        PaidType::Momo => {
            let Some(momo) = body.momo.as_ref() else {
                return Err(CoreError::Validation("momo payload is required".into()).into());
            };
            let payment = MomoPayment {
                order_id: momo.order_id.clone(),
                amount: momo.amount,
                phone_number: momo.phone_number.clone(),
                app_data: momo.data.clone(),
            };
            match state.momo.confirm(&payment).await {
                Ok(response) => {
                    let payload = serde_json::to_value(&response).unwrap_or_default();
                    // Momo app payments return no reusable card token.
                    (payload, None)
                }
                Err(e) => {
                    record_failure(&state, &uc, paid_type, body.amounts, &e).await;
                    return Err(e.into());
                }
            }
        }
        PaidType::Alepay => {
            let Some(alepay) = body.alepay.as_ref() else {
                return Err(CoreError::Validation("alepay payload is required".into()).into());
            };
            // Alepay completed the charge on its side; only the reported
            // fields are checked, no outbound call is made.
            alepay.validate()?;
            let payload = serde_json::to_value(alepay).unwrap_or_default();
            (payload, card_from_callback(alepay))
        }
    };

    // 5. One transaction applies the whole settlement fan-out.
    let outcome = SettlementRepo::settle_challenge(
        &state.pool,
        SettleChallenge {
            order_id: &order_id,
            paid_type,
            amounts: body.amounts,
            gateway_payload,
            discount_code: body.discount_code.as_deref(),
            card: card.as_ref(),
            referral_bonus: state.config.reward.referral_bonus_points,
            now: Utc::now(),
        },
    )
    .await?;

    let (message, settled) = match outcome {
        SettlementOutcome::Settled(uc) => ("Payment confirmed", uc),
        SettlementOutcome::AlreadySettled(uc) => ("Payment already confirmed", uc),
        SettlementOutcome::TargetNotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Order",
                key: order_id,
            }));
        }
        SettlementOutcome::NotSettleable => {
            return Err(CoreError::state(
                StateCode::NotSettleable,
                "order cannot be settled in its current state",
            )
            .into());
        }
    };

    Ok(Json(MessageResponse {
        message,
        data: settled,
    }))
}

// ---------------------------------------------------------------------------
// Alepay webhook (server-to-server)
// ---------------------------------------------------------------------------

/// PUT /api/v1/payments/alepay/confirm
///
/// Alepay's server-to-server confirmation. `check_key` authenticates the
/// caller (no JWT on this route); `data` is base64-encoded JSON. The order
/// code resolves to a pending challenge enrollment first, then to a
/// pending product delivery.
pub async fn alepay_webhook(
    State(state): State<AppState>,
    Json(body): Json<AlepayWebhookRequest>,
) -> AppResult<impl IntoResponse> {
    // 1. Authenticate the webhook caller.
    if body.check_key != state.config.alepay_check_key {
        return Err(CoreError::Unauthorized("invalid check_key".into()).into());
    }

    // 2. Decode and validate the callback payload.
    let callback = AlepayCallback::from_base64(&body.data)?;
    let amounts = PaymentAmounts {
        total: callback.amount,
        total_pay: callback.amount,
        discount: 0,
        fee: callback.merchant_fee,
    };
    let gateway_payload = serde_json::to_value(&callback).unwrap_or_default();
    let card = card_from_callback(&callback);

    // 3. Challenge enrollments take priority. The settlement transaction
    //    re-locks by order id, so this lookup only routes.
    if EnrollmentRepo::find_by_order_id(&state.pool, &callback.order_code)
        .await?
        .is_some()
    {
        let outcome = SettlementRepo::settle_challenge(
            &state.pool,
            SettleChallenge {
                order_id: &callback.order_code,
                paid_type: PaidType::Alepay,
                amounts,
                gateway_payload,
                discount_code: None,
                card: card.as_ref(),
                referral_bonus: state.config.reward.referral_bonus_points,
                now: Utc::now(),
            },
        )
        .await?;

        let (message, uc) = match outcome {
            SettlementOutcome::Settled(uc) => ("Payment confirmed", uc),
            SettlementOutcome::AlreadySettled(uc) => ("Payment already confirmed", uc),
            SettlementOutcome::TargetNotFound => {
                return Err(AppError::Core(CoreError::NotFound {
                    entity: "Order",
                    key: callback.order_code.clone(),
                }));
            }
            SettlementOutcome::NotSettleable => {
                return Err(CoreError::state(
                    StateCode::NotSettleable,
                    "order cannot be settled in its current state",
                )
                .into());
            }
        };
        return Ok(Json(MessageResponse {
            message,
            data: serde_json::to_value(&uc).unwrap_or_default(),
        }));
    }

    // 4. No enrollment: try product deliveries.
    let outcome = SettlementRepo::settle_delivery(
        &state.pool,
        SettleDelivery {
            order_id: &callback.order_code,
            paid_type: PaidType::Alepay,
            amounts,
            gateway_payload,
        },
    )
    .await?;

    let (message, delivery) = match outcome {
        SettlementOutcome::Settled(d) => ("Payment confirmed", d),
        SettlementOutcome::AlreadySettled(d) => ("Payment already confirmed", d),
        SettlementOutcome::TargetNotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Order",
                key: callback.order_code.clone(),
            }));
        }
        SettlementOutcome::NotSettleable => {
            return Err(CoreError::state(
                StateCode::NotSettleable,
                "delivery is cancelled and cannot be settled",
            )
            .into());
        }
    };

    Ok(Json(MessageResponse {
        message,
        data: serde_json::to_value(&delivery).unwrap_or_default(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Best-effort Failed mark on the ledger after a gateway error. Logs and
/// swallows its own failure so the original error is what surfaces.
async fn record_failure(
    state: &AppState,
    uc: &UserChallenge,
    paid_type: PaidType,
    amounts: PaymentAmounts,
    error: &GatewayError,
) {
    let record = RecordPayment {
        order_id: &uc.order_id,
        user_id: uc.user_id,
        challenge_id: Some(uc.challenge_id),
        user_challenge_id: Some(uc.id),
        delivery_id: None,
        paid_type,
        amounts,
        gateway_payload: failure_payload(error),
    };
    if let Err(e) = PaymentHistoryRepo::record_failed(&state.pool, &record).await {
        tracing::error!(
            order_id = %uc.order_id,
            error = %e,
            "failed to record failed payment attempt",
        );
    }
}

/// Ledger payload describing a failed confirmation attempt.
fn failure_payload(error: &GatewayError) -> serde_json::Value {
    match error {
        GatewayError::Declined { status, message } => serde_json::json!({
            "status": status,
            "message": message,
        }),
        other => serde_json::json!({ "error": other.to_string() }),
    }
}

/// Card token material carried by an Alepay callback, if the customer
/// saved the card during checkout.
fn card_from_callback(callback: &AlepayCallback) -> Option<CreateCardLink> {
    if !callback.has_card_token() {
        return None;
    }
    callback.alepay_token.clone().map(|token| CreateCardLink {
        token,
        card_number: callback.card_number.clone(),
        bank_code: callback.bank_code.clone(),
        bank_type: callback.bank_type.clone(),
        method: callback.method.clone(),
    })
}
