//! Delivery error type.

use std::future::Future;
use std::time::Duration;

/// Why a delivery attempt failed.
///
/// A failed attempt leaves its record pending; the next tick retries it.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The remote endpoint could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Credentials were refused.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The remote endpoint answered with an error.
    #[error("delivery rejected: {0}")]
    Rejected(String),

    /// The attempt exceeded its time budget.
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),

    /// The outgoing message could not be built.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The image could not be read or converted.
    #[error("media error: {0}")]
    Media(String),

    /// A template failed to render.
    #[error("template error: {0}")]
    Template(String),
}

/// Run one outbound call under `limit`.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, DeliveryError>
where
    F: Future<Output = Result<T, DeliveryError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::Timeout(limit)),
    }
}
