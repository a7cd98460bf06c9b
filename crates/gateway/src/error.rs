//! Error type shared by the gateway adapters.

/// Errors from a gateway confirmation attempt.
///
/// `Payload` means the caller-supplied gateway data was malformed and the
/// client can correct it; the other variants are provider-side failures, and
/// the pending order is kept so the same order id can be retried.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Gateway returned HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The gateway processed the request but declined the payment.
    #[error("Payment declined by gateway (status {status}): {message}")]
    Declined {
        /// Provider result code (non-zero).
        status: i64,
        /// Provider message, if any.
        message: String,
    },

    /// A required field is missing or invalid in the gateway payload.
    #[error("Invalid gateway payload: {0}")]
    Payload(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declined_display_names_status_and_message() {
        let err = GatewayError::Declined {
            status: 9,
            message: "insufficient funds".into(),
        };
        assert_eq!(
            err.to_string(),
            "Payment declined by gateway (status 9): insufficient funds"
        );
    }

    #[test]
    fn http_status_display_includes_body() {
        let err = GatewayError::HttpStatus {
            status: 503,
            body: "maintenance".into(),
        };
        assert_eq!(err.to_string(), "Gateway returned HTTP 503: maintenance");
    }
}
