//! TWITTER and INSTAGRAM sharing runner.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use benefich_channel::{DueItem, SharingSender};
use benefich_core::error::AppError;
use benefich_core::result::AppResult;
use benefich_core::traits::ErrorReporter;
use benefich_database::{ContentStore, ScheduleStore};
use benefich_entity::{Channel, ContentKind, Sharing};

use super::{DispatchRunner, RunSummary, report};
use crate::provider::DueItemProvider;

/// Posts due sharings one at a time, in provider order.
#[derive(Debug)]
pub struct SharingRunner {
    provider: DueItemProvider<Sharing>,
    schedules: Arc<dyn ScheduleStore<Sharing>>,
    contents: Arc<dyn ContentStore>,
    sender: Arc<dyn SharingSender>,
    reporter: Arc<dyn ErrorReporter>,
}

impl SharingRunner {
    pub fn new(
        kind: ContentKind,
        schedules: Arc<dyn ScheduleStore<Sharing>>,
        contents: Arc<dyn ContentStore>,
        sender: Arc<dyn SharingSender>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            provider: DueItemProvider::new(Arc::clone(&schedules), kind),
            schedules,
            contents,
            sender,
            reporter,
        }
    }
}

#[async_trait]
impl DispatchRunner for SharingRunner {
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

        for record in due {
            let id = record.id;
            let content = match self
                .contents
                .find_content(self.kind(), record.content_id())
                .await
            {
                Ok(Some(content)) => content,
                Ok(None) => {
                    let err = AppError::not_found(format!(
                        "{} {} referenced by sharing {} does not exist",
                        self.kind(),
                        record.content_id(),
                        id
                    ));
                    report(&*self.reporter, self.kind(), self.channel(), Some(id.get()), &err);
                    summary.failed += 1;
                    continue;
                }
                Err(err) => {
                    report(&*self.reporter, self.kind(), self.channel(), Some(id.get()), &err);
                    summary.failed += 1;
                    continue;
                }
            };

            let item = DueItem::new(record, content);
            match self.sender.publish(&item).await {
                Ok(()) => match self.schedules.mark_sent(id).await {
                    Ok(flipped) => {
                        if flipped {
                            summary.delivered += 1;
                        }
                        tracing::info!(
                            sharing_id = %id,
                            kind = %self.kind(),
                            channel = %self.channel(),
                            attempt_id = %item.attempt_id,
                            "Sharing published"
                        );
                    }
                    Err(err) => {
                        report(&*self.reporter, self.kind(), self.channel(), Some(id.get()), &err);
                        summary.unconfirmed += 1;
                    }
                },
                Err(err) => {
                    report(&*self.reporter, self.kind(), self.channel(), Some(id.get()), &err);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
