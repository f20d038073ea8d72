//! Store traits consumed by the dispatcher.
//!
//! The dispatcher never talks to PostgreSQL directly. It asks these traits
//! for due records, the parent content, and the recipient list, and uses
//! them to flip `sent` flags. [`crate::repositories`] implements them on
//! PostgreSQL and [`MemoryStore`] implements them in memory.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use benefich_core::result::AppResult;
use benefich_core::types::ContentId;
use benefich_entity::{Content, ContentKind, DeliverySummary, Recipient, Scheduled};

pub use memory::MemoryStore;

/// Lookup of content items.
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a content item of `kind` by id.
    async fn find_content(&self, kind: ContentKind, id: ContentId) -> AppResult<Option<Content>>;

    /// Per-channel counts of the item's scheduled records.
    async fn delivery_summary(&self, id: ContentId) -> AppResult<DeliverySummary>;
}

/// Scheduled records of one family (notifications or sharings).
#[async_trait]
pub trait ScheduleStore<R: Scheduled>: Send + Sync + std::fmt::Debug + 'static {
    /// Records of `kind` with `due_at <= now`, not yet sent, targeted at `channel`.
    async fn find_due(
        &self,
        kind: ContentKind,
        channel: R::Channel,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<R>>;

    /// Flag a record as sent unless it already is.
    ///
    /// Returns `true` only when this call flipped the flag.
    async fn mark_sent(&self, id: R::Id) -> AppResult<bool>;
}

/// The registered users that receive email notifications.
#[async_trait]
pub trait RecipientStore: Send + Sync + std::fmt::Debug + 'static {
    /// Every active recipient, read fresh on each call.
    async fn list_recipients(&self) -> AppResult<Vec<Recipient>>;
}
