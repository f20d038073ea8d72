//! Social network transport abstraction.

use std::path::Path;

use async_trait::async_trait;

use crate::error::DeliveryError;

/// Posts a photo with a caption to one social account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialTransport: Send + Sync {
    /// Publish `jpeg` with `caption`. Returns the network's post id.
    async fn post_photo(&self, jpeg: &Path, caption: &str) -> Result<String, DeliveryError>;
}
