//! Repository for the `gift_videos` reward inventory.

use sqlx::{PgConnection, PgPool};

use crate::models::gift::{CreateGiftVideo, GiftVideo};

/// Column list for `gift_videos` queries.
const COLUMNS: &str = "id, title, url, is_active, created_at, updated_at";

pub struct GiftVideoRepo;

impl GiftVideoRepo {
    pub async fn create(pool: &PgPool, input: &CreateGiftVideo) -> Result<GiftVideo, sqlx::Error> {
        let query = format!(
            "INSERT INTO gift_videos (title, url) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GiftVideo>(&query)
            .bind(&input.title)
            .bind(&input.url)
            .fetch_one(pool)
            .await
    }

    /// A random active video for a gift resolution, if any are left.
    pub async fn random_active_in_tx(
        conn: &mut PgConnection,
    ) -> Result<Option<GiftVideo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM gift_videos \
             WHERE is_active \
             ORDER BY RANDOM() \
             LIMIT 1"
        );
        sqlx::query_as::<_, GiftVideo>(&query)
            .fetch_optional(&mut *conn)
            .await
    }
}
