//! Scheduled notification entity.

use benefich_core::types::{ContentId, NotificationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::{Schedule, Scheduled};
use crate::channel::NotificationChannel;
use crate::content::ContentKind;

/// An email or push alert scheduled for a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier.
    pub id: NotificationId,
    /// Kind of the parent content item.
    pub kind: ContentKind,
    /// Due time, sent flag, and channel.
    #[serde(flatten)]
    pub schedule: Schedule<NotificationChannel>,
}

impl Notification {
    /// A pending notification.
    pub fn new(
        id: NotificationId,
        kind: ContentKind,
        content_id: ContentId,
        notify_at: DateTime<Utc>,
        channel: NotificationChannel,
    ) -> Self {
        Self {
            id,
            kind,
            schedule: Schedule::pending(content_id, notify_at, channel),
        }
    }

    /// Parent content item.
    pub fn content_id(&self) -> ContentId {
        self.schedule.content_id
    }

    /// Whether the notification was delivered.
    pub fn notified(&self) -> bool {
        self.schedule.sent
    }
}

impl Scheduled for Notification {
    type Id = NotificationId;
    type Channel = NotificationChannel;

    fn id(&self) -> NotificationId {
        self.id
    }

    fn kind(&self) -> ContentKind {
        self.kind
    }

    fn schedule(&self) -> &Schedule<NotificationChannel> {
        &self.schedule
    }

    fn schedule_mut(&mut self) -> &mut Schedule<NotificationChannel> {
        &mut self.schedule
    }
}

impl<'r> FromRow<'r, PgRow> for Notification {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            kind: row.try_get("content_kind")?,
            schedule: Schedule {
                content_id: row.try_get("content_id")?,
                due_at: row.try_get("notify_at")?,
                sent: row.try_get("notified")?,
                channel: row.try_get("channel")?,
            },
        })
    }
}
