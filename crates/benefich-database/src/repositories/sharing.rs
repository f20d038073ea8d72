//! Sharing repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use benefich_core::error::{AppError, ErrorKind};
use benefich_core::result::AppResult;
use benefich_core::types::SharingId;
use benefich_entity::{ContentKind, Sharing, SocialChannel};

use crate::store::ScheduleStore;

/// Repository for scheduled social sharings.
#[derive(Debug, Clone)]
pub struct SharingRepository {
    pool: PgPool,
}

impl SharingRepository {
    /// Create a new sharing repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleStore<Sharing> for SharingRepository {
    async fn find_due(
        &self,
        kind: ContentKind,
        channel: SocialChannel,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Sharing>> {
        sqlx::query_as::<_, Sharing>(
            "SELECT id, content_id, content_kind, channel, publish_at, published, description \
             FROM sharings \
             WHERE content_kind = $1 AND channel = $2 AND published = FALSE AND publish_at <= $3 \
             ORDER BY publish_at, id",
        )
        .bind(kind)
        .bind(channel)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list due sharings", e))
    }

    async fn mark_sent(&self, id: SharingId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sharings SET published = TRUE, modified_at = NOW() \
             WHERE id = $1 AND published = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark published", e))?;
        Ok(result.rows_affected() == 1)
    }
}
