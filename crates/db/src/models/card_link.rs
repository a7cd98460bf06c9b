//! Linked card (gateway token) models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strider_core::types::{DbId, Timestamp};

/// A row from the `card_links` table: a reusable gateway card token.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CardLink {
    pub id: DbId,
    pub user_id: DbId,
    pub token: String,
    pub card_number: Option<String>,
    pub bank_code: Option<String>,
    pub bank_type: Option<String>,
    pub method: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Card token material captured from a gateway confirmation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCardLink {
    pub token: String,
    pub card_number: Option<String>,
    pub bank_code: Option<String>,
    pub bank_type: Option<String>,
    pub method: Option<String>,
}
