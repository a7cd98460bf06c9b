use std::sync::Arc;

use strider_core::envelope::Envelope;
use strider_gateway::momo::MomoClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: strider_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Momo gateway client (holds the outbound reqwest client).
    pub momo: Arc<MomoClient>,
    /// Codec for the encrypted enrollment payload.
    pub envelope: Envelope,
}

impl AppState {
    /// Assemble state from loaded configuration and an open pool.
    ///
    /// # Panics
    ///
    /// Panics if `ENVELOPE_KEY` is not 64 hex characters; the envelope is
    /// useless with a bad key, so boot fails instead.
    pub fn new(pool: strider_db::DbPool, config: ServerConfig) -> Self {
        let envelope = Envelope::from_hex_key(&config.envelope_key)
            .expect("ENVELOPE_KEY must be 64 hex characters");
        let momo = Arc::new(MomoClient::new(config.momo.clone()));

        AppState {
            pool,
            config: Arc::new(config),
            momo,
            envelope,
        }
    }
}
