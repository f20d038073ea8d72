//! Content repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use benefich_core::error::{AppError, ErrorKind};
use benefich_core::result::AppResult;
use benefich_core::types::ContentId;
use benefich_entity::{Channel, Content, ContentKind, DeliverySummary};

use crate::store::ContentStore;

const SELECT_CONTENT: &str = "SELECT c.id, c.kind, c.title, c.body, c.author_id, c.image_path, \
     c.publish_at, c.unpublish_at, c.pinned, c.created_at, c.modified_at, \
     c.event_start, c.event_end, c.place_id, p.name AS place_name, \
     p.address AS place_address, p.lat AS place_lat, p.lng AS place_lng, \
     c.benefit_start, c.benefit_end \
     FROM contents c LEFT JOIN places p ON p.id = c.place_id";

/// Repository for content items.
#[derive(Debug, Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    /// Create a new content repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for ContentRepository {
    async fn find_content(&self, kind: ContentKind, id: ContentId) -> AppResult<Option<Content>> {
        sqlx::query_as::<_, Content>(&format!("{SELECT_CONTENT} WHERE c.id = $1 AND c.kind = $2"))
            .bind(id)
            .bind(kind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find content", e))
    }

    async fn delivery_summary(&self, id: ContentId) -> AppResult<DeliverySummary> {
        let rows = sqlx::query_as::<_, (String, i64, i64)>(
            "SELECT channel::text, COUNT(*), COUNT(*) FILTER (WHERE notified) \
             FROM notifications WHERE content_id = $1 GROUP BY channel \
             UNION ALL \
             SELECT channel::text, COUNT(*), COUNT(*) FILTER (WHERE published) \
             FROM sharings WHERE content_id = $1 GROUP BY channel",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to summarize deliveries", e)
        })?;

        let mut summary = DeliverySummary::default();
        for (channel, total, sent) in rows {
            let channel: Channel = channel.parse().map_err(AppError::database)?;
            let count = summary.count_mut(channel);
            count.total = total.max(0) as u64;
            count.sent = sent.max(0) as u64;
        }
        Ok(summary)
    }
}
