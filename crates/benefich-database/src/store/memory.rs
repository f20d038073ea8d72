//! In-memory content store.
//!
//! Backs the test suites and the integration tests. State lives behind a
//! `tokio::sync::RwLock` so the store can be shared between runners.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use benefich_core::error::AppError;
use benefich_core::result::AppResult;
use benefich_core::types::{ContentId, NotificationId, SharingId, UserId};
use benefich_entity::{
    Channel, Content, ContentKind, DeliverySummary, Notification, NotificationChannel,
    Recipient, Scheduled, Sharing, SocialChannel,
};

use super::{ContentStore, RecipientStore, ScheduleStore};

#[derive(Debug, Default)]
struct MemoryState {
    contents: BTreeMap<ContentId, Content>,
    notifications: Vec<Notification>,
    sharings: Vec<Sharing>,
    recipients: Vec<Recipient>,
    next_id: i64,
    unavailable: bool,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable {
            return Err(AppError::database("memory store is unavailable"));
        }
        Ok(())
    }
}

/// Content store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a content item.
    pub async fn insert_content(&self, content: Content) {
        let mut state = self.state.write().await;
        state.contents.insert(content.id, content);
    }

    /// Schedule a notification for `content_id`.
    pub async fn schedule_notification(
        &self,
        kind: ContentKind,
        content_id: ContentId,
        notify_at: DateTime<Utc>,
        channel: NotificationChannel,
    ) -> NotificationId {
        let mut state = self.state.write().await;
        let id = NotificationId(state.next_id());
        state
            .notifications
            .push(Notification::new(id, kind, content_id, notify_at, channel));
        id
    }

    /// Schedule a sharing for `content_id`.
    pub async fn schedule_sharing(
        &self,
        kind: ContentKind,
        content_id: ContentId,
        publish_at: DateTime<Utc>,
        channel: SocialChannel,
        description: Option<String>,
    ) -> SharingId {
        let mut state = self.state.write().await;
        let id = SharingId(state.next_id());
        state.sharings.push(Sharing::new(
            id,
            kind,
            content_id,
            publish_at,
            channel,
            description,
        ));
        id
    }

    /// Register a recipient.
    pub async fn add_recipient(&self, email: &str) -> UserId {
        let mut state = self.state.write().await;
        let id = UserId(state.next_id());
        state.recipients.push(Recipient {
            id,
            email: email.to_string(),
            display_name: None,
        });
        id
    }

    /// Look up a notification regardless of its state.
    pub async fn notification(&self, id: NotificationId) -> Option<Notification> {
        let state = self.state.read().await;
        state.notifications.iter().find(|n| n.id == id).copied()
    }

    /// Look up a sharing regardless of its state.
    pub async fn sharing(&self, id: SharingId) -> Option<Sharing> {
        let state = self.state.read().await;
        state.sharings.iter().find(|s| s.id == id).cloned()
    }

    /// Make every store call fail with a database error.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }
}

fn due<R: Scheduled>(
    records: &[R],
    kind: ContentKind,
    channel: R::Channel,
    now: DateTime<Utc>,
) -> Vec<R> {
    records
        .iter()
        .filter(|r| r.kind() == kind && r.schedule().is_due(channel, now))
        .cloned()
        .collect()
}

fn mark<R: Scheduled>(records: &mut [R], id: R::Id) -> bool {
    records
        .iter_mut()
        .find(|r| r.id() == id)
        .map(|r| r.schedule_mut().mark_sent())
        .unwrap_or(false)
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find_content(&self, kind: ContentKind, id: ContentId) -> AppResult<Option<Content>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.contents.get(&id).filter(|c| c.kind() == kind).cloned())
    }

    async fn delivery_summary(&self, id: ContentId) -> AppResult<DeliverySummary> {
        let state = self.state.read().await;
        state.check_available()?;

        let mut summary = DeliverySummary::default();
        for n in state.notifications.iter().filter(|n| n.content_id() == id) {
            summary.record(Channel::from(n.schedule.channel), n.schedule.sent);
        }
        for s in state.sharings.iter().filter(|s| s.content_id() == id) {
            summary.record(Channel::from(s.schedule.channel), s.schedule.sent);
        }
        Ok(summary)
    }
}

#[async_trait]
impl ScheduleStore<Notification> for MemoryStore {
    async fn find_due(
        &self,
        kind: ContentKind,
        channel: NotificationChannel,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Notification>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(due(&state.notifications, kind, channel, now))
    }

    async fn mark_sent(&self, id: NotificationId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let flipped = mark(&mut state.notifications, id);
        debug!(notification_id = %id, flipped, "Marked notification");
        Ok(flipped)
    }
}

#[async_trait]
impl ScheduleStore<Sharing> for MemoryStore {
    async fn find_due(
        &self,
        kind: ContentKind,
        channel: SocialChannel,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Sharing>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(due(&state.sharings, kind, channel, now))
    }

    async fn mark_sent(&self, id: SharingId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let flipped = mark(&mut state.sharings, id);
        debug!(sharing_id = %id, flipped, "Marked sharing");
        Ok(flipped)
    }
}

#[async_trait]
impl RecipientStore for MemoryStore {
    async fn list_recipients(&self) -> AppResult<Vec<Recipient>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.recipients.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benefich_core::error::ErrorKind;
    use benefich_entity::ContentDetails;
    use chrono::Duration;

    fn news(id: i64) -> Content {
        let now = Utc::now();
        Content {
            id: ContentId(id),
            title: "Elecciones FECh".to_string(),
            body: String::new(),
            author_id: None,
            image_path: None,
            publish_at: now,
            unpublish_at: None,
            pinned: false,
            created_at: now,
            modified_at: now,
            details: ContentDetails::New,
        }
    }

    #[tokio::test]
    async fn test_find_due_filters_kind_channel_time_and_flag() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert_content(news(1)).await;

        let due_id = store
            .schedule_notification(ContentKind::New, ContentId(1), now, NotificationChannel::Email)
            .await;
        store
            .schedule_notification(
                ContentKind::New,
                ContentId(1),
                now + Duration::minutes(5),
                NotificationChannel::Email,
            )
            .await;
        store
            .schedule_notification(ContentKind::New, ContentId(1), now, NotificationChannel::Mobile)
            .await;
        store
            .schedule_notification(ContentKind::Event, ContentId(1), now, NotificationChannel::Email)
            .await;

        let found = ScheduleStore::<Notification>::find_due(
            &store,
            ContentKind::New,
            NotificationChannel::Email,
            now,
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, due_id);
    }

    #[tokio::test]
    async fn test_mark_sent_flips_once() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let id = store
            .schedule_sharing(
                ContentKind::New,
                ContentId(1),
                now,
                SocialChannel::Instagram,
                None,
            )
            .await;

        assert!(ScheduleStore::<Sharing>::mark_sent(&store, id).await.unwrap());
        assert!(!ScheduleStore::<Sharing>::mark_sent(&store, id).await.unwrap());
        assert!(store.sharing(id).await.unwrap().published());

        let due =
            ScheduleStore::<Sharing>::find_due(&store, ContentKind::New, SocialChannel::Instagram, now)
                .await
                .unwrap();
        assert!(due.is_empty());
    }

    #[tokio::test]
    async fn test_delivery_summary_counts_per_channel() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert_content(news(1)).await;
        let sent = store
            .schedule_notification(ContentKind::New, ContentId(1), now, NotificationChannel::Mobile)
            .await;
        store
            .schedule_notification(ContentKind::New, ContentId(1), now, NotificationChannel::Mobile)
            .await;
        store
            .schedule_sharing(ContentKind::New, ContentId(1), now, SocialChannel::Twitter, None)
            .await;
        ScheduleStore::<Notification>::mark_sent(&store, sent).await.unwrap();

        let summary = store.delivery_summary(ContentId(1)).await.unwrap();
        assert_eq!(summary.mobile.total, 2);
        assert_eq!(summary.mobile.sent, 1);
        assert_eq!(summary.twitter.total, 1);
        assert_eq!(summary.email.total, 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_returns_database_error() {
        let store = MemoryStore::new();
        store.set_unavailable(true).await;

        let err = store.list_recipients().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(
            store
                .find_content(ContentKind::New, ContentId(1))
                .await
                .is_err()
        );
    }
}
