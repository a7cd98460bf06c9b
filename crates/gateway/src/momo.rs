//! Momo app-payment client: two-phase authorize/capture with HMAC-signed
//! requests.
//!
//! `pay/app` places an authorization hold, `pay/confirm` captures it. A
//! capture that fails after a successful authorize leaves money held on the
//! customer's wallet, so [`MomoClient::confirm`] fires a best-effort
//! `revertAuthorize` in the background; its failure is logged for manual
//! reconciliation, never retried synchronously.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strider_core::signing::hmac_sha256_hex;

use crate::error::GatewayError;

/// Momo provider result code for success.
pub const MOMO_SUCCESS: i64 = 0;

/// Capture request type on `pay/confirm`.
const REQUEST_TYPE_CAPTURE: &str = "capture";
/// Compensation request type on `pay/confirm`.
const REQUEST_TYPE_REVERT: &str = "revertAuthorize";

/// Connection settings for the Momo endpoint.
#[derive(Debug, Clone)]
pub struct MomoConfig {
    /// Base HTTP URL, e.g. `https://payment.momo.vn`.
    pub base_url: String,
    pub partner_code: String,
    pub access_key: String,
    /// HMAC-SHA256 key for request signatures.
    pub secret_key: String,
    /// Timeout for a single gateway request.
    pub timeout: Duration,
}

/// One payment to confirm, as reported by the paying client.
#[derive(Debug, Clone)]
pub struct MomoPayment {
    /// Our order id; doubles as the partner reference at Momo.
    pub order_id: String,
    pub amount: i64,
    pub phone_number: String,
    /// Opaque app token produced by the Momo SDK on the device.
    pub app_data: String,
}

/// Response shape shared by `pay/app` and `pay/confirm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomoResponse {
    /// Provider result code; [`MOMO_SUCCESS`] means accepted.
    pub status: i64,
    #[serde(default)]
    pub message: Option<String>,
    /// Momo-side transaction id, set on success.
    #[serde(default)]
    pub transid: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
}

/// Outbound body for `pay/app`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizeRequest<'a> {
    partner_code: &'a str,
    access_key: &'a str,
    partner_ref_id: &'a str,
    customer_number: &'a str,
    app_data: &'a str,
    amount: i64,
    version: f32,
    signature: String,
}

/// Outbound body for `pay/confirm` (capture and revert share the shape).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest<'a> {
    partner_code: &'a str,
    partner_ref_id: &'a str,
    request_type: &'a str,
    request_id: &'a str,
    momo_trans_id: &'a str,
    signature: String,
}

/// HTTP client for the Momo payment gateway.
#[derive(Clone)]
pub struct MomoClient {
    client: reqwest::Client,
    config: MomoConfig,
}

impl MomoClient {
    pub fn new(config: MomoConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Run the full two-phase confirmation for one payment.
    ///
    /// Returns the capture response on success. On a capture failure after a
    /// successful authorize, a `revertAuthorize` is spawned in the background
    /// before the error is returned.
    pub async fn confirm(&self, payment: &MomoPayment) -> Result<MomoResponse, GatewayError> {
        let authorized = self.authorize(payment).await?;
        let transid = authorized.transid.clone().unwrap_or_default();

        match self.capture(&payment.order_id, &transid).await {
            Ok(captured) => Ok(captured),
            Err(e) => {
                tracing::error!(
                    order_id = %payment.order_id,
                    transid = %transid,
                    error = %e,
                    "Momo capture failed after authorize, reverting"
                );
                self.spawn_revert(payment.order_id.clone(), transid);
                Err(e)
            }
        }
    }

    /// Phase one: place an authorization hold via `pay/app`.
    pub async fn authorize(&self, payment: &MomoPayment) -> Result<MomoResponse, GatewayError> {
        let signature = hmac_sha256_hex(
            &self.config.secret_key,
            &authorize_signature_base(
                &self.config.partner_code,
                &payment.order_id,
                payment.amount,
            ),
        );
        let body = AuthorizeRequest {
            partner_code: &self.config.partner_code,
            access_key: &self.config.access_key,
            partner_ref_id: &payment.order_id,
            customer_number: &payment.phone_number,
            app_data: &payment.app_data,
            amount: payment.amount,
            version: 2.0,
            signature,
        };

        let response = self
            .client
            .post(format!("{}/pay/app", self.config.base_url))
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Phase two: capture an authorized hold via `pay/confirm`.
    pub async fn capture(
        &self,
        order_id: &str,
        momo_trans_id: &str,
    ) -> Result<MomoResponse, GatewayError> {
        self.pay_confirm(order_id, momo_trans_id, REQUEST_TYPE_CAPTURE)
            .await
    }

    /// Release an authorized hold that could not be captured.
    pub async fn revert_authorize(
        &self,
        order_id: &str,
        momo_trans_id: &str,
    ) -> Result<MomoResponse, GatewayError> {
        self.pay_confirm(order_id, momo_trans_id, REQUEST_TYPE_REVERT)
            .await
    }

    async fn pay_confirm(
        &self,
        order_id: &str,
        momo_trans_id: &str,
        request_type: &str,
    ) -> Result<MomoResponse, GatewayError> {
        let signature = hmac_sha256_hex(
            &self.config.secret_key,
            &confirm_signature_base(
                &self.config.partner_code,
                order_id,
                request_type,
                momo_trans_id,
            ),
        );
        let body = ConfirmRequest {
            partner_code: &self.config.partner_code,
            partner_ref_id: order_id,
            request_type,
            request_id: order_id,
            momo_trans_id,
            signature,
        };

        let response = self
            .client
            .post(format!("{}/pay/confirm", self.config.base_url))
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Fire-and-forget revert of a held authorization.
    fn spawn_revert(&self, order_id: String, momo_trans_id: String) {
        let client = self.clone();
        tokio::spawn(async move {
            match client.revert_authorize(&order_id, &momo_trans_id).await {
                Ok(_) => {
                    tracing::info!(order_id = %order_id, "Momo authorization reverted");
                }
                Err(e) => {
                    // Left for manual reconciliation; the hold expires at Momo.
                    tracing::error!(
                        order_id = %order_id,
                        transid = %momo_trans_id,
                        error = %e,
                        "Momo revertAuthorize failed"
                    );
                }
            }
        });
    }

    /// Map HTTP and provider-level failures into [`GatewayError`].
    async fn parse_response(response: reqwest::Response) -> Result<MomoResponse, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MomoResponse = response.json().await?;
        if parsed.status != MOMO_SUCCESS {
            return Err(GatewayError::Declined {
                status: parsed.status,
                message: parsed.message.clone().unwrap_or_default(),
            });
        }
        Ok(parsed)
    }
}

/// Canonical string signed on `pay/app`.
fn authorize_signature_base(partner_code: &str, order_id: &str, amount: i64) -> String {
    format!("partnerCode={partner_code}&partnerRefId={order_id}&amount={amount}")
}

/// Canonical string signed on `pay/confirm`.
fn confirm_signature_base(
    partner_code: &str,
    order_id: &str,
    request_type: &str,
    momo_trans_id: &str,
) -> String {
    format!(
        "partnerCode={partner_code}&partnerRefId={order_id}&requestType={request_type}&momoTransId={momo_trans_id}"
    )
}
