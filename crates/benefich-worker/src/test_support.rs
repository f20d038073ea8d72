//! Fakes and fixtures shared by the worker tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use benefich_channel::{Confirmations, DeliveryError, DueItem, NotificationSender, SharingSender};
use benefich_core::error::AppError;
use benefich_core::result::AppResult;
use benefich_core::traits::{ErrorReporter, FailureScope};
use benefich_core::types::{ContentId, NotificationId, SharingId};
use benefich_database::{MemoryStore, ScheduleStore};
use benefich_entity::{
    Content, ContentDetails, ContentKind, Notification, NotificationChannel, Recipient, Scheduled,
    Sharing, SocialChannel,
};

pub(crate) fn content(id: i64, kind: ContentKind, now: DateTime<Utc>) -> Content {
    let details = match kind {
        ContentKind::Event => ContentDetails::Event {
            start: now,
            end: None,
            place: None,
        },
        ContentKind::New => ContentDetails::New,
        ContentKind::Benefit => ContentDetails::Benefit {
            start: NaiveDate::from_ymd_opt(2019, 10, 1),
            end: None,
        },
    };
    Content {
        id: ContentId(id),
        title: format!("{kind} {id}"),
        body: "<p>cuerpo</p>".to_string(),
        author_id: None,
        image_path: Some(format!("images/{id}.jpg")),
        publish_at: now,
        unpublish_at: None,
        pinned: false,
        created_at: now,
        modified_at: now,
        details,
    }
}

/// Notification sender that records each batch.
#[derive(Debug)]
pub(crate) struct FakeNotifier {
    channel: NotificationChannel,
    pub(crate) fail_batch: bool,
    pub(crate) fail_ids: HashSet<NotificationId>,
    pub(crate) batches: Mutex<Vec<(Vec<NotificationId>, usize)>>,
}

impl FakeNotifier {
    pub(crate) fn new(channel: NotificationChannel) -> Self {
        Self {
            channel,
            fail_batch: false,
            fail_ids: HashSet::new(),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn batches(&self) -> Vec<(Vec<NotificationId>, usize)> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for FakeNotifier {
    fn channel(&self) -> NotificationChannel {
        self.channel
    }

    fn needs_recipients(&self) -> bool {
        self.channel == NotificationChannel::Email
    }

    async fn send(
        &self,
        items: &[DueItem<Notification>],
        recipients: &[Recipient],
    ) -> Result<Confirmations<Notification>, DeliveryError> {
        if items.is_empty() || (self.needs_recipients() && recipients.is_empty()) {
            return Ok(Vec::new());
        }
        let ids: Vec<_> = items.iter().map(|i| i.record.id).collect();
        self.batches
            .lock()
            .unwrap()
            .push((ids.clone(), recipients.len()));
        if self.fail_batch {
            return Err(DeliveryError::ConnectionFailed("relay down".to_string()));
        }
        Ok(ids
            .into_iter()
            .map(|id| {
                let result = if self.fail_ids.contains(&id) {
                    Err(DeliveryError::Rejected("bad topic".to_string()))
                } else {
                    Ok(())
                };
                (id, result)
            })
            .collect())
    }
}

/// Sharing publisher that records each post.
#[derive(Debug)]
pub(crate) struct FakePublisher {
    channel: SocialChannel,
    pub(crate) fail_ids: HashSet<SharingId>,
    pub(crate) posts: Mutex<Vec<(SharingId, String)>>,
}

impl FakePublisher {
    pub(crate) fn new(channel: SocialChannel) -> Self {
        Self {
            channel,
            fail_ids: HashSet::new(),
            posts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn posted(&self) -> Vec<SharingId> {
        self.posts.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }
}

#[async_trait]
impl SharingSender for FakePublisher {
    fn channel(&self) -> SocialChannel {
        self.channel
    }

    async fn publish(&self, item: &DueItem<Sharing>) -> Result<(), DeliveryError> {
        let caption = item.record.caption(&item.content.title).to_string();
        self.posts.lock().unwrap().push((item.record.id, caption));
        if self.fail_ids.contains(&item.record.id) {
            return Err(DeliveryError::Rejected("duplicate status".to_string()));
        }
        Ok(())
    }
}

/// Reporter that keeps the scope of every captured failure.
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    scopes: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn scopes(&self) -> Vec<String> {
        self.scopes.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn capture(&self, scope: FailureScope<'_>, _error: &(dyn std::error::Error + 'static)) {
        self.scopes.lock().unwrap().push(scope.to_string());
    }
}

/// Store whose `mark_sent` fails for the listed record ids.
#[derive(Debug)]
pub(crate) struct FailingMarks {
    pub(crate) inner: MemoryStore,
    pub(crate) fail_on: HashSet<String>,
}

#[async_trait]
impl<R> ScheduleStore<R> for FailingMarks
where
    R: Scheduled,
    MemoryStore: ScheduleStore<R>,
{
    async fn find_due(
        &self,
        kind: ContentKind,
        channel: R::Channel,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<R>> {
        ScheduleStore::<R>::find_due(&self.inner, kind, channel, now).await
    }

    async fn mark_sent(&self, id: R::Id) -> AppResult<bool> {
        if self.fail_on.contains(&id.to_string()) {
            return Err(AppError::database("connection reset while marking"));
        }
        ScheduleStore::<R>::mark_sent(&self.inner, id).await
    }
}
