//! Sender traits implemented by every channel.

use async_trait::async_trait;
use uuid::Uuid;

use benefich_entity::{Content, Notification, NotificationChannel, Recipient, Scheduled, Sharing, SocialChannel};

use crate::error::DeliveryError;

/// A due record together with its parent content.
///
/// Each instance carries a fresh attempt id that downstream systems can use
/// to recognise a redelivered message.
#[derive(Debug, Clone)]
pub struct DueItem<R> {
    /// The scheduled record.
    pub record: R,
    /// The content item it announces.
    pub content: Content,
    /// Identifier of this delivery attempt.
    pub attempt_id: Uuid,
}

impl<R> DueItem<R> {
    /// Pair a record with its content under a new attempt id.
    pub fn new(record: R, content: Content) -> Self {
        Self {
            record,
            content,
            attempt_id: Uuid::new_v4(),
        }
    }
}

/// Per-record results of a notification send.
pub type Confirmations<R> = Vec<(<R as Scheduled>::Id, Result<(), DeliveryError>)>;

/// A sender for EMAIL or MOBILE notifications.
#[async_trait]
pub trait NotificationSender: Send + Sync + std::fmt::Debug {
    /// The channel served by this sender.
    fn channel(&self) -> NotificationChannel;

    /// Whether [`send`](Self::send) needs the recipient list.
    fn needs_recipients(&self) -> bool;

    /// Deliver `items`.
    ///
    /// `Err` means the whole batch failed and nothing may be marked. `Ok`
    /// lists the records that were attempted; an empty list means nothing
    /// was sent.
    async fn send(
        &self,
        items: &[DueItem<Notification>],
        recipients: &[Recipient],
    ) -> Result<Confirmations<Notification>, DeliveryError>;
}

/// A publisher for TWITTER or INSTAGRAM sharings.
#[async_trait]
pub trait SharingSender: Send + Sync + std::fmt::Debug {
    /// The channel served by this publisher.
    fn channel(&self) -> SocialChannel;

    /// Post one sharing. `Ok` only on confirmed publication.
    async fn publish(&self, item: &DueItem<Sharing>) -> Result<(), DeliveryError>;
}
