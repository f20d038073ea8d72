//! EMAIL and MOBILE notification runner.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use benefich_channel::{DueItem, NotificationSender};
use benefich_core::error::AppError;
use benefich_core::result::AppResult;
use benefich_core::traits::ErrorReporter;
use benefich_database::{ContentStore, RecipientStore, ScheduleStore};
use benefich_entity::{Channel, ContentKind, Notification};

use super::{DispatchRunner, RunSummary, report};
use crate::provider::DueItemProvider;

/// Hands every due notification of one kind to the channel sender in a
/// single call and flags the records it confirms.
#[derive(Debug)]
pub struct NotificationRunner {
    provider: DueItemProvider<Notification>,
    schedules: Arc<dyn ScheduleStore<Notification>>,
    contents: Arc<dyn ContentStore>,
    recipients: Arc<dyn RecipientStore>,
    sender: Arc<dyn NotificationSender>,
    reporter: Arc<dyn ErrorReporter>,
}

impl NotificationRunner {
    pub fn new(
        kind: ContentKind,
        schedules: Arc<dyn ScheduleStore<Notification>>,
        contents: Arc<dyn ContentStore>,
        recipients: Arc<dyn RecipientStore>,
        sender: Arc<dyn NotificationSender>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            provider: DueItemProvider::new(Arc::clone(&schedules), kind),
            schedules,
            contents,
            recipients,
            sender,
            reporter,
        }
    }

    fn report(&self, record_id: Option<i64>, error: &(dyn std::error::Error + 'static)) {
        report(
            self.reporter.as_ref(),
            self.kind(),
            self.channel(),
            record_id,
            error,
        );
    }
}

#[async_trait]
impl DispatchRunner for NotificationRunner {
    fn kind(&self) -> ContentKind {
        self.provider.kind()
    }

    fn channel(&self) -> Channel {
        self.sender.channel().into()
    }

    async fn run(&self, now: DateTime<Utc>) -> AppResult<RunSummary> {
        let due = self.provider.get_due_at(self.sender.channel(), now).await?;
        let mut summary = RunSummary {
            due: due.len(),
            ..RunSummary::default()
        };
        if due.is_empty() {
            return Ok(summary);
        }

        let mut items = Vec::with_capacity(due.len());
        for record in due {
            match self
                .contents
                .find_content(self.kind(), record.content_id())
                .await
            {
                Ok(Some(content)) => items.push(DueItem::new(record, content)),
                Err(err) => {
                    self.report(Some(record.id.get()), &err);
                    summary.failed += 1;
                }
                Ok(None) => {
                    let err = AppError::not_found(format!(
                        "{} {} referenced by notification {} does not exist",
                        self.kind(),
                        record.content_id(),
                        record.id
                    ));
                    self.report(Some(record.id.get()), &err);
                    summary.failed += 1;
                }
            }
        }
        if items.is_empty() {
            return Ok(summary);
        }

        let recipients = if self.sender.needs_recipients() {
            self.recipients.list_recipients().await?
        } else {
            Vec::new()
        };

        let confirmations = match self.sender.send(&items, &recipients).await {
            Ok(confirmations) => confirmations,
            Err(err) => {
                self.report(None, &err);
                summary.failed += items.len();
                return Ok(summary);
            }
        };

        if confirmations.is_empty() {
            tracing::warn!(
                kind = %self.kind(),
                channel = %self.channel(),
                pending = items.len(),
                recipients = recipients.len(),
                "Nothing was sent; records stay pending"
            );
            return Ok(summary);
        }

        for (id, result) in confirmations {
            match result {
                Ok(()) => match self.schedules.mark_sent(id).await {
                    Ok(true) => summary.delivered += 1,
                    Ok(false) => {
                        tracing::debug!(notification_id = %id, "Notification was already marked");
                    }
                    Err(err) => {
                        self.report(Some(id.get()), &err);
                        summary.unconfirmed += 1;
                    }
                },
                Err(err) => {
                    self.report(Some(id.get()), &err);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            kind = %self.kind(),
            channel = %self.channel(),
            due = summary.due,
            delivered = summary.delivered,
            failed = summary.failed,
            unconfirmed = summary.unconfirmed,
            "Notification run finished"
        );
        Ok(summary)
    }
}
