//! Mail transport abstraction.

use async_trait::async_trait;

use crate::error::DeliveryError;

/// One rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// `Message-ID` header value, derived from the attempt id.
    pub message_id: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
    /// Every address the message goes to.
    pub recipients: Vec<String>,
}

/// Hands a batch of messages to a mail relay.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send every message over one connection. `Err` if any message failed.
    async fn send_batch(&self, messages: Vec<OutgoingEmail>) -> Result<(), DeliveryError>;
}
