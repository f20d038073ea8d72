//! Scheduled child records of a content item.

pub mod notification;
pub mod sharing;

use std::fmt::{Debug, Display};

use benefich_core::types::ContentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ContentKind;

pub use notification::Notification;
pub use sharing::Sharing;

/// Fields shared by every scheduled record.
///
/// `sent` only ever moves from `false` to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule<C> {
    /// Parent content item.
    pub content_id: ContentId,
    /// When the record becomes due.
    pub due_at: DateTime<Utc>,
    /// Whether delivery was confirmed.
    pub sent: bool,
    /// Target channel.
    pub channel: C,
}

impl<C: Copy + PartialEq> Schedule<C> {
    /// A pending record.
    pub fn pending(content_id: ContentId, due_at: DateTime<Utc>, channel: C) -> Self {
        Self {
            content_id,
            due_at,
            sent: false,
            channel,
        }
    }

    /// Whether the record must be delivered on `channel` at `now`.
    pub fn is_due(&self, channel: C, now: DateTime<Utc>) -> bool {
        !self.sent && self.channel == channel && self.due_at <= now
    }

    /// Flag the record as sent. Returns `true` if this call flipped it.
    pub fn mark_sent(&mut self) -> bool {
        let flipped = !self.sent;
        self.sent = true;
        flipped
    }
}

/// A record that the dispatcher delivers once it is due.
pub trait Scheduled: Clone + Debug + Send + Sync + 'static {
    /// Identifier type of the record.
    type Id: Copy + Eq + Display + Debug + Send + Sync + 'static;
    /// Channel type the record targets.
    type Channel: Copy + Eq + Display + Debug + Send + Sync + 'static;

    /// Record identifier.
    fn id(&self) -> Self::Id;

    /// Kind of the parent content item.
    fn kind(&self) -> ContentKind;

    /// Shared scheduling fields.
    fn schedule(&self) -> &Schedule<Self::Channel>;

    /// Mutable scheduling fields.
    fn schedule_mut(&mut self) -> &mut Schedule<Self::Channel>;
}
