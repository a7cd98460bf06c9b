//! Repository for the `card_links` table.

use sqlx::{PgConnection, PgPool};
use strider_core::types::DbId;

use crate::models::card_link::{CardLink, CreateCardLink};

/// Column list for `card_links` queries.
const COLUMNS: &str =
    "id, user_id, token, card_number, bank_code, bank_type, method, created_at, updated_at";

pub struct CardLinkRepo;

impl CardLinkRepo {
    /// Persist a gateway card token captured during settlement.
    pub async fn insert_in_tx(
        conn: &mut PgConnection,
        user_id: DbId,
        input: &CreateCardLink,
    ) -> Result<CardLink, sqlx::Error> {
        let query = format!(
            "INSERT INTO card_links (user_id, token, card_number, bank_code, bank_type, method) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CardLink>(&query)
            .bind(user_id)
            .bind(&input.token)
            .bind(&input.card_number)
            .bind(&input.bank_code)
            .bind(&input.bank_type)
            .bind(&input.method)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<CardLink>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM card_links \
             WHERE user_id = $1 \
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, CardLink>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
