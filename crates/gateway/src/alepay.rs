//! Alepay payment adapter.
//!
//! Alepay completes the charge on its own side before anything reaches us,
//! so there is no outbound call here. Two surfaces carry its result: the
//! client-initiated confirm request and the server-to-server webhook whose
//! `data` field is base64-encoded JSON. Both decode to [`AlepayCallback`],
//! which is validated before settlement runs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Payment result fields reported by Alepay.
///
/// The optional card fields are present when the customer opted to save the
/// card during checkout; `alepay_token` is the handle later charges use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlepayCallback {
    #[serde(default)]
    pub order_code: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub merchant_fee: i64,
    #[serde(default)]
    pub transaction_code: String,
    #[serde(default)]
    pub alepay_token: Option<String>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub bank_code: Option<String>,
    #[serde(default)]
    pub bank_type: Option<String>,
    #[serde(default)]
    pub card_link_code: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

impl AlepayCallback {
    /// Decode the webhook `data` field: base64 wrapping a JSON object.
    pub fn from_base64(data: &str) -> Result<Self, GatewayError> {
        let raw = BASE64
            .decode(data.trim())
            .map_err(|_| GatewayError::Payload("webhook data is not valid base64".into()))?;
        let callback: Self = serde_json::from_slice(&raw)
            .map_err(|e| GatewayError::Payload(format!("webhook data is not valid JSON: {e}")))?;
        callback.validate()?;
        Ok(callback)
    }

    /// Check the fields every settlement needs.
    ///
    /// Alepay has already moved the money when this payload arrives; a
    /// malformed one is a caller bug, not a declined payment.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.order_code.trim().is_empty() {
            return Err(GatewayError::Payload("order_code is required".into()));
        }
        if self.transaction_code.trim().is_empty() {
            return Err(GatewayError::Payload("transaction_code is required".into()));
        }
        if self.amount <= 0 {
            return Err(GatewayError::Payload(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.merchant_fee < 0 {
            return Err(GatewayError::Payload(format!(
                "merchant_fee must not be negative, got {}",
                self.merchant_fee
            )));
        }
        Ok(())
    }

    /// Whether the payload carries a saved-card token to persist.
    pub fn has_card_token(&self) -> bool {
        self.alepay_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}
