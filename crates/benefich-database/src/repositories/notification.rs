//! Notification repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use benefich_core::error::{AppError, ErrorKind};
use benefich_core::result::AppResult;
use benefich_core::types::NotificationId;
use benefich_entity::{ContentKind, Notification, NotificationChannel};

use crate::store::ScheduleStore;

/// Repository for scheduled notifications.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleStore<Notification> for NotificationRepository {
    async fn find_due(
        &self,
        kind: ContentKind,
        channel: NotificationChannel,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT id, content_id, content_kind, channel, notify_at, notified \
             FROM notifications \
             WHERE content_kind = $1 AND channel = $2 AND notified = FALSE AND notify_at <= $3 \
             ORDER BY notify_at, id",
        )
        .bind(kind)
        .bind(channel)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list due notifications", e)
        })
    }

    async fn mark_sent(&self, id: NotificationId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET notified = TRUE, modified_at = NOW() \
             WHERE id = $1 AND notified = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark notified", e))?;
        Ok(result.rows_affected() == 1)
    }
}
