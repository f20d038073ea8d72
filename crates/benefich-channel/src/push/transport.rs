//! Push transport abstraction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DeliveryError;

/// A topic broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    /// Topic subscribers listen on.
    pub topic: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// String key/value payload delivered to the app.
    pub data: BTreeMap<String, String>,
}

/// Delivers a broadcast to a push provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Send one broadcast. `Ok` once the provider accepted it.
    async fn send(&self, message: &PushMessage) -> Result<(), DeliveryError>;
}
