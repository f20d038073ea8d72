//! Due record lookup.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use benefich_core::result::AppResult;
use benefich_database::ScheduleStore;
use benefich_entity::{ContentKind, Scheduled};

/// Returns the records of one content kind that are due on a channel.
///
/// Every call goes back to the store; nothing is cached between calls.
#[derive(Debug)]
pub struct DueItemProvider<R: Scheduled> {
    store: Arc<dyn ScheduleStore<R>>,
    kind: ContentKind,
}

impl<R: Scheduled> Clone for DueItemProvider<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            kind: self.kind,
        }
    }
}

impl<R: Scheduled> DueItemProvider<R> {
    /// Provider for the `kind` records held by `store`.
    pub fn new(store: Arc<dyn ScheduleStore<R>>, kind: ContentKind) -> Self {
        Self { store, kind }
    }

    /// Content kind served by this provider.
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Records with `due_at <= now`, not yet sent, targeted at `channel`.
    pub async fn get_due(&self, channel: R::Channel) -> AppResult<Vec<R>> {
        self.get_due_at(channel, Utc::now()).await
    }

    /// Same as [`get_due`](Self::get_due) against a fixed clock.
    pub async fn get_due_at(&self, channel: R::Channel, now: DateTime<Utc>) -> AppResult<Vec<R>> {
        let records = self.store.find_due(self.kind, channel, now).await?;
        tracing::debug!(
            kind = %self.kind,
            channel = %channel,
            due = records.len(),
            "Fetched due records"
        );
        Ok(records)
    }
}
