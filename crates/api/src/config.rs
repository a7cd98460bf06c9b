use std::time::Duration;

use strider_gateway::momo::MomoConfig;

use crate::auth::jwt::JwtConfig;

/// Reward sizing knobs applied at settlement and gift-box time.
#[derive(Debug, Clone)]
pub struct RewardConfig {
    /// Upper bound for a random bonus-point grant (default: `50`).
    pub max_bonus_point: i64,
    /// Fixed credit to a referrer on their referee's first settlement
    /// (default: `5000`).
    pub referral_bonus_points: i64,
}

/// Server configuration loaded from environment variables.
///
/// Network and timeout fields have development defaults; every secret
/// (JWT, gateway credentials, envelope key) must be supplied explicitly so
/// a misconfigured deployment fails at startup, not at first payment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Momo gateway endpoint and credentials.
    pub momo: MomoConfig,
    /// Shared secret the Alepay webhook must present in `check_key`.
    pub alepay_check_key: String,
    /// AES-256-GCM key for the enrollment request envelope, 64 hex chars.
    pub envelope_key: String,
    /// Reward sizing.
    pub reward: RewardConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                       |
    /// |--------------------------|-------------------------------|
    /// | `HOST`                   | `0.0.0.0`                     |
    /// | `PORT`                   | `3000`                        |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`       |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                          |
    /// | `MOMO_BASE_URL`          | `https://test-payment.momo.vn`|
    /// | `GATEWAY_TIMEOUT_SECS`   | `10`                          |
    /// | `MAX_BONUS_POINT`        | `50`                          |
    /// | `REFERRAL_BONUS_POINTS`  | `5000`                        |
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable fails to parse, or if any of
    /// `JWT_SECRET`, `MOMO_PARTNER_CODE`, `MOMO_ACCESS_KEY`,
    /// `MOMO_SECRET_KEY`, `ALEPAY_CHECK_KEY`, `ENVELOPE_KEY` is missing.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        let gateway_timeout_secs: u64 = std::env::var("GATEWAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("GATEWAY_TIMEOUT_SECS must be a valid u64");

        let momo = MomoConfig {
            base_url: std::env::var("MOMO_BASE_URL")
                .unwrap_or_else(|_| "https://test-payment.momo.vn".into()),
            partner_code: std::env::var("MOMO_PARTNER_CODE")
                .expect("MOMO_PARTNER_CODE must be set in the environment"),
            access_key: std::env::var("MOMO_ACCESS_KEY")
                .expect("MOMO_ACCESS_KEY must be set in the environment"),
            secret_key: std::env::var("MOMO_SECRET_KEY")
                .expect("MOMO_SECRET_KEY must be set in the environment"),
            timeout: Duration::from_secs(gateway_timeout_secs),
        };

        let alepay_check_key = std::env::var("ALEPAY_CHECK_KEY")
            .expect("ALEPAY_CHECK_KEY must be set in the environment");
        assert!(
            !alepay_check_key.is_empty(),
            "ALEPAY_CHECK_KEY must not be empty"
        );

        let envelope_key =
            std::env::var("ENVELOPE_KEY").expect("ENVELOPE_KEY must be set in the environment");

        let max_bonus_point: i64 = std::env::var("MAX_BONUS_POINT")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("MAX_BONUS_POINT must be a valid i64");

        let referral_bonus_points: i64 = std::env::var("REFERRAL_BONUS_POINTS")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("REFERRAL_BONUS_POINTS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            momo,
            alepay_check_key,
            envelope_key,
            reward: RewardConfig {
                max_bonus_point,
                referral_bonus_points,
            },
        }
    }
}
