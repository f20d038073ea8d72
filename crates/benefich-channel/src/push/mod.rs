//! Mobile push notifications.

pub mod fcm;
pub mod transport;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use benefich_core::config::{PushConfig, PushKindConfig};
use benefich_core::error::AppError;
use benefich_entity::{ContentField, ContentKind, Notification, NotificationChannel, Recipient};

use crate::error::{DeliveryError, with_timeout};
use crate::sender::{Confirmations, DueItem, NotificationSender};
use crate::template::TemplateRenderer;

pub use fcm::FcmClient;
pub use transport::{PushMessage, PushTransport};

const BODY_TEMPLATE: &str = "push_body";

fn title_template(kind: ContentKind) -> String {
    format!("{kind}_title")
}

fn topic_template(kind: ContentKind) -> String {
    format!("{kind}_topic")
}

/// Characters FCM accepts in a topic name.
fn is_valid_topic(topic: &str) -> bool {
    !topic.is_empty()
        && topic.len() <= 900
        && topic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.~%".contains(c))
}

/// Broadcasts one push message per due notification.
///
/// Each record is confirmed on its own: a failed broadcast does not stop
/// the remaining ones.
pub struct PushSender {
    transport: Arc<dyn PushTransport>,
    templates: TemplateRenderer,
    timeout: Duration,
}

impl std::fmt::Debug for PushSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushSender")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl PushSender {
    /// Compile the per-kind title and topic templates.
    pub fn new(
        config: &PushConfig,
        transport: Arc<dyn PushTransport>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let mut templates = TemplateRenderer::plain();
        templates.register(BODY_TEMPLATE, &config.body)?;

        let kinds: [(ContentKind, &PushKindConfig); 3] = [
            (ContentKind::Event, &config.event),
            (ContentKind::New, &config.new),
            (ContentKind::Benefit, &config.benefit),
        ];
        for (kind, texts) in kinds {
            templates.register(&title_template(kind), &texts.title)?;
            templates.register(&topic_template(kind), &texts.topic)?;
        }

        Ok(Self {
            transport,
            templates,
            timeout,
        })
    }

    /// Render the broadcast for `item`.
    pub fn compose(&self, item: &DueItem<Notification>) -> Result<PushMessage, DeliveryError> {
        let kind = item.content.kind();
        let context = ContentField::context(&item.content);

        let topic = self.templates.render(&topic_template(kind), &context)?;
        if !is_valid_topic(&topic) {
            return Err(DeliveryError::InvalidMessage(format!(
                "rendered topic '{topic}' is not a valid FCM topic"
            )));
        }

        let mut data = BTreeMap::new();
        data.insert("kind".to_string(), kind.to_string());
        data.insert("content_id".to_string(), item.content.id.to_string());
        data.insert("notification_id".to_string(), item.record.id.to_string());
        data.insert("attempt_id".to_string(), item.attempt_id.to_string());

        Ok(PushMessage {
            topic,
            title: self.templates.render(&title_template(kind), &context)?,
            body: self.templates.render(BODY_TEMPLATE, &context)?,
            data,
        })
    }

    async fn deliver(&self, item: &DueItem<Notification>) -> Result<(), DeliveryError> {
        let message = self.compose(item)?;
        with_timeout(self.timeout, self.transport.send(&message)).await
    }
}

#[async_trait]
impl NotificationSender for PushSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Mobile
    }

    fn needs_recipients(&self) -> bool {
        false
    }

    async fn send(
        &self,
        items: &[DueItem<Notification>],
        _recipients: &[Recipient],
    ) -> Result<Confirmations<Notification>, DeliveryError> {
        let mut confirmations = Vec::with_capacity(items.len());
        for item in items {
            let result = self.deliver(item).await;
            if let Err(e) = &result {
                warn!(notification_id = %item.record.id, error = %e, "Push broadcast failed");
            }
            confirmations.push((item.record.id, result));
        }

        let delivered = confirmations.iter().filter(|(_, r)| r.is_ok()).count();
        info!(attempted = items.len(), delivered, "Push broadcasts sent");
        Ok(confirmations)
    }
}
