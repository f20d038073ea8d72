//! Email notifications.

pub mod smtp;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use benefich_core::config::{EmailConfig, EmailHeadlines};
use benefich_core::error::{AppError, ErrorKind};
use benefich_entity::{ContentField, ContentKind, Notification, NotificationChannel, Recipient};

use crate::error::{DeliveryError, with_timeout};
use crate::sender::{Confirmations, DueItem, NotificationSender};
use crate::template::TemplateRenderer;

pub use smtp::SmtpMailTransport;
pub use transport::{MailTransport, OutgoingEmail};

const BODY_TEMPLATE: &str = "email_body";
const BUNDLED_TEMPLATE: &str = include_str!("../../templates/notification.hbs");

/// Sends one HTML email per due notification, to every recipient, in a
/// single transport call.
pub struct EmailSender {
    transport: Arc<dyn MailTransport>,
    templates: TemplateRenderer,
    headlines: EmailHeadlines,
    timeout: Duration,
}

impl std::fmt::Debug for EmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSender")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl EmailSender {
    /// Compile the body template and wrap `transport`.
    pub fn new(
        config: &EmailConfig,
        transport: Arc<dyn MailTransport>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let source = match &config.template_path {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Cannot read email template '{path}'"),
                    e,
                )
            })?,
            None => BUNDLED_TEMPLATE.to_string(),
        };

        let mut templates = TemplateRenderer::html();
        templates.register(BODY_TEMPLATE, &source)?;

        Ok(Self {
            transport,
            templates,
            headlines: config.headlines.clone(),
            timeout,
        })
    }

    fn headline(&self, kind: ContentKind) -> &str {
        match kind {
            ContentKind::Event => &self.headlines.event,
            ContentKind::New => &self.headlines.new,
            ContentKind::Benefit => &self.headlines.benefit,
        }
    }

    fn compose(
        &self,
        item: &DueItem<Notification>,
        recipients: &[String],
    ) -> Result<OutgoingEmail, DeliveryError> {
        let mut context = ContentField::context(&item.content);
        context.insert(
            "headline".to_string(),
            Value::from(self.headline(item.content.kind())),
        );

        Ok(OutgoingEmail {
            message_id: format!("<{}@benefich>", item.attempt_id),
            subject: item.content.title.clone(),
            html_body: self.templates.render(BODY_TEMPLATE, &context)?,
            recipients: recipients.to_vec(),
        })
    }
}

#[async_trait]
impl NotificationSender for EmailSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    fn needs_recipients(&self) -> bool {
        true
    }

    async fn send(
        &self,
        items: &[DueItem<Notification>],
        recipients: &[Recipient],
    ) -> Result<Confirmations<Notification>, DeliveryError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let addresses: Vec<String> = recipients
            .iter()
            .filter(|r| r.has_address())
            .map(|r| r.email.trim().to_string())
            .collect();
        if addresses.is_empty() {
            warn!(pending = items.len(), "No recipients registered; email batch not sent");
            return Ok(Vec::new());
        }

        let messages = items
            .iter()
            .map(|item| self.compose(item, &addresses))
            .collect::<Result<Vec<_>, _>>()?;

        with_timeout(self.timeout, self.transport.send_batch(messages)).await?;

        info!(
            messages = items.len(),
            recipients = addresses.len(),
            "Email batch sent"
        );
        Ok(items.iter().map(|item| (item.record.id, Ok(()))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::transport::MockMailTransport;
    use crate::test_support::{event, notification};
    use benefich_core::types::UserId;

    fn recipient(email: &str) -> Recipient {
        Recipient {
            id: UserId(1),
            email: email.to_string(),
            display_name: None,
        }
    }

    fn sender(transport: MockMailTransport) -> EmailSender {
        EmailSender::new(
            &EmailConfig::default(),
            Arc::new(transport),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_two_notifications_one_transport_call() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send_batch()
            .withf(|messages| {
                messages.len() == 2
                    && messages[0].subject == "Feria de Clubes"
                    && messages[1].subject == "Cicletada"
                    && messages
                        .iter()
                        .all(|m| m.recipients == vec!["ana@uchile.cl".to_string()])
            })
            .times(1)
            .returning(|_| Ok(()));

        let first = event(1, "Feria de Clubes", 42);
        let second = event(2, "Cicletada", 7);
        let items = vec![
            notification(10, &first, NotificationChannel::Email),
            notification(11, &second, NotificationChannel::Email),
        ];

        let confirmations = sender(transport)
            .send(&items, &[recipient("ana@uchile.cl")])
            .await
            .unwrap();
        assert_eq!(confirmations.len(), 2);
        assert!(confirmations.iter().all(|(_, r)| r.is_ok()));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_call() {
        let mut transport = MockMailTransport::new();
        transport.expect_send_batch().times(0);

        let confirmations = sender(transport)
            .send(&[], &[recipient("ana@uchile.cl")])
            .await
            .unwrap();
        assert!(confirmations.is_empty());
    }

    #[tokio::test]
    async fn test_no_recipients_makes_no_call() {
        let mut transport = MockMailTransport::new();
        transport.expect_send_batch().times(0);

        let content = event(1, "Feria de Clubes", 42);
        let items = vec![notification(10, &content, NotificationChannel::Email)];
        let confirmations = sender(transport)
            .send(&items, &[recipient("  ")])
            .await
            .unwrap();
        assert!(confirmations.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_fails_whole_batch() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send_batch()
            .times(1)
            .returning(|_| Err(DeliveryError::ConnectionFailed("relay down".to_string())));

        let content = event(1, "Feria de Clubes", 42);
        let items = vec![
            notification(10, &content, NotificationChannel::Email),
            notification(11, &content, NotificationChannel::Email),
        ];
        let err = sender(transport)
            .send(&items, &[recipient("ana@uchile.cl")])
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::ConnectionFailed(_)));
    }

    #[test]
    fn test_compose_renders_headline_body_and_message_id() {
        let email = sender(MockMailTransport::new());
        let content = event(1, "Cine & Debate", 42);
        let item = notification(10, &content, NotificationChannel::Email);

        let message = email
            .compose(&item, &["ana@uchile.cl".to_string()])
            .unwrap();
        assert_eq!(message.subject, "Cine & Debate");
        assert_eq!(message.message_id, format!("<{}@benefich>", item.attempt_id));
        assert!(message.html_body.contains("BenefiCh - ¡Se ha añadido un evento!"));
        assert!(message.html_body.contains("Cine &amp; Debate"));
        assert!(message.html_body.contains("<p>Inscripciones abiertas</p>"));
        assert!(message.html_body.contains("Patio Central"));
    }

    #[test]
    fn test_missing_template_file_is_a_configuration_error() {
        let config = EmailConfig {
            template_path: Some("/nonexistent/benefich/notification.hbs".to_string()),
            ..EmailConfig::default()
        };
        let err = EmailSender::new(
            &config,
            Arc::new(MockMailTransport::new()),
            Duration::from_secs(5),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
