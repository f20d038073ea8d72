//! Scheduled social sharing entity.

use benefich_core::types::{ContentId, SharingId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::{Schedule, Scheduled};
use crate::channel::SocialChannel;
use crate::content::ContentKind;

/// A social post scheduled for a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sharing {
    /// Sharing identifier.
    pub id: SharingId,
    /// Kind of the parent content item.
    pub kind: ContentKind,
    /// Due time, sent flag, and channel.
    #[serde(flatten)]
    pub schedule: Schedule<SocialChannel>,
    /// Caption override.
    pub description: Option<String>,
}

impl Sharing {
    /// A pending sharing.
    pub fn new(
        id: SharingId,
        kind: ContentKind,
        content_id: ContentId,
        publish_at: DateTime<Utc>,
        channel: SocialChannel,
        description: Option<String>,
    ) -> Self {
        Self {
            id,
            kind,
            schedule: Schedule::pending(content_id, publish_at, channel),
            description,
        }
    }

    /// Parent content item.
    pub fn content_id(&self) -> ContentId {
        self.schedule.content_id
    }

    /// Whether the sharing was posted.
    pub fn published(&self) -> bool {
        self.schedule.sent
    }

    /// The post caption: the description when set, else `fallback`.
    pub fn caption<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => fallback,
        }
    }
}

impl Scheduled for Sharing {
    type Id = SharingId;
    type Channel = SocialChannel;

    fn id(&self) -> SharingId {
        self.id
    }

    fn kind(&self) -> ContentKind {
        self.kind
    }

    fn schedule(&self) -> &Schedule<SocialChannel> {
        &self.schedule
    }

    fn schedule_mut(&mut self) -> &mut Schedule<SocialChannel> {
        &mut self.schedule
    }
}

impl<'r> FromRow<'r, PgRow> for Sharing {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            kind: row.try_get("content_kind")?,
            schedule: Schedule {
                content_id: row.try_get("content_id")?,
                due_at: row.try_get("publish_at")?,
                sent: row.try_get("published")?,
                channel: row.try_get("channel")?,
            },
            description: row.try_get("description")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_falls_back_to_title() {
        let now = Utc::now();
        let mut sharing = Sharing::new(
            SharingId(3),
            ContentKind::Event,
            ContentId(1),
            now,
            SocialChannel::Twitter,
            None,
        );
        assert_eq!(sharing.caption("Feria de Clubes"), "Feria de Clubes");

        sharing.description = Some("   ".to_string());
        assert_eq!(sharing.caption("Feria de Clubes"), "Feria de Clubes");

        sharing.description = Some("¡Nos vemos el jueves!".to_string());
        assert_eq!(sharing.caption("Feria de Clubes"), "¡Nos vemos el jueves!");
    }
}
