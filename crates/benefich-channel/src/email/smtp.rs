//! SMTP transport built on lettre.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use benefich_core::config::EmailConfig;

use super::transport::{MailTransport, OutgoingEmail};
use crate::error::DeliveryError;

/// Pooled SMTP relay client.
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailTransport")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpMailTransport {
    /// Build a client for the relay in `config`.
    ///
    /// Port 465 uses implicit TLS; any other port negotiates STARTTLS.
    pub fn new(config: &EmailConfig) -> Result<Self, DeliveryError> {
        let builder = (if config.smtp_port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        })
        .map_err(|e: lettre::transport::smtp::Error| {
            DeliveryError::ConnectionFailed(e.to_string())
        })?
        .port(config.smtp_port);

        let builder = if config.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
        };

        let from = config
            .from_address
            .parse()
            .map_err(|e: lettre::address::AddressError| {
                DeliveryError::InvalidMessage(format!("invalid from address: {e}"))
            })?;

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    fn build(&self, email: OutgoingEmail) -> Result<Message, DeliveryError> {
        // Recipients go in Bcc so addresses are not disclosed to each other.
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.from.clone())
            .message_id(Some(email.message_id))
            .subject(email.subject);

        for recipient in &email.recipients {
            let mailbox: Mailbox =
                recipient
                    .parse()
                    .map_err(|e: lettre::address::AddressError| {
                        DeliveryError::InvalidMessage(format!(
                            "invalid recipient address '{recipient}': {e}"
                        ))
                    })?;
            builder = builder.bcc(mailbox);
        }

        builder
            .header(ContentType::TEXT_HTML)
            .body(email.html_body)
            .map_err(|e| DeliveryError::InvalidMessage(format!("failed to build email: {e}")))
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send_batch(&self, messages: Vec<OutgoingEmail>) -> Result<(), DeliveryError> {
        let built = messages
            .into_iter()
            .map(|m| self.build(m))
            .collect::<Result<Vec<_>, _>>()?;

        let count = built.len();
        for message in built {
            self.mailer
                .send(message)
                .await
                .map_err(|e: lettre::transport::smtp::Error| {
                    if e.is_permanent() {
                        DeliveryError::Rejected(e.to_string())
                    } else {
                        DeliveryError::ConnectionFailed(e.to_string())
                    }
                })?;
        }

        debug!(count, "SMTP batch handed to relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            smtp_host: "localhost".to_string(),
            username: "benefich".to_string(),
            password: "secret".to_string(),
            ..EmailConfig::default()
        }
    }

    #[tokio::test]
    async fn test_new_with_valid_params() {
        assert!(SmtpMailTransport::new(&config()).is_ok());
    }

    #[tokio::test]
    async fn test_new_rejects_bad_from_address() {
        let config = EmailConfig {
            from_address: "not an address".to_string(),
            ..config()
        };
        let err = SmtpMailTransport::new(&config).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidMessage(_)));
    }

    #[tokio::test]
    async fn test_build_puts_recipients_in_bcc() {
        let transport = SmtpMailTransport::new(&config()).unwrap();
        let message = transport
            .build(OutgoingEmail {
                message_id: "<a1@benefich>".to_string(),
                subject: "Feria de Clubes".to_string(),
                html_body: "<p>hola</p>".to_string(),
                recipients: vec!["ana@uchile.cl".to_string(), "luis@uchile.cl".to_string()],
            })
            .unwrap();

        let to: Vec<String> = message.envelope().to().iter().map(|a| a.to_string()).collect();
        assert!(to.contains(&"ana@uchile.cl".to_string()));
        assert!(to.contains(&"luis@uchile.cl".to_string()));
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(!raw.contains("ana@uchile.cl"));
        assert!(raw.contains("Message-ID: <a1@benefich>"));
    }
}
