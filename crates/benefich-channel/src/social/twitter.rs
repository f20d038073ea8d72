//! Twitter (X) API v2 client.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use benefich_core::config::TwitterConfig;

use super::ensure_success;
use super::transport::SocialTransport;
use crate::error::DeliveryError;

/// Longest tweet text accepted.
pub const MAX_TWEET_CHARS: usize = 280;

#[derive(Debug, Deserialize)]
struct IdEnvelope {
    data: IdData,
}

#[derive(Debug, Deserialize)]
struct IdData {
    id: String,
}

/// Posts photo tweets with an OAuth 2.0 user-context token.
pub struct TwitterClient {
    client: Client,
    api_base: String,
    access_token: String,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TwitterClient {
    /// Build a client from the Twitter configuration.
    pub fn new(config: &TwitterConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    async fn upload(&self, jpeg: &Path) -> Result<String, DeliveryError> {
        let bytes = tokio::fs::read(jpeg)
            .await
            .map_err(|e| DeliveryError::Media(format!("cannot read '{}': {e}", jpeg.display())))?;
        let part = Part::bytes(bytes)
            .file_name("media.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| DeliveryError::InvalidMessage(e.to_string()))?;
        let form = Form::new()
            .text("media_category", "tweet_image")
            .part("media", part);

        let response = self
            .client
            .post(format!("{}/2/media/upload", self.api_base))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DeliveryError::ConnectionFailed(e.to_string()))?;
        let uploaded: IdEnvelope = ensure_success(response, "Twitter media upload")
            .await?
            .json()
            .await
            .map_err(|e| DeliveryError::Rejected(format!("unexpected upload response: {e}")))?;
        Ok(uploaded.data.id)
    }
}

/// Cut `text` to at most `limit` characters, marking the cut with an ellipsis.
pub fn truncate_caption(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[async_trait]
impl SocialTransport for TwitterClient {
    async fn post_photo(&self, jpeg: &Path, caption: &str) -> Result<String, DeliveryError> {
        let media_id = self.upload(jpeg).await?;
        debug!(media_id = %media_id, "Uploaded tweet media");

        let response = self
            .client
            .post(format!("{}/2/tweets", self.api_base))
            .bearer_auth(&self.access_token)
            .json(&json!({
                "text": truncate_caption(caption, MAX_TWEET_CHARS),
                "media": { "media_ids": [media_id] },
            }))
            .send()
            .await
            .map_err(|e| DeliveryError::ConnectionFailed(e.to_string()))?;
        let tweet: IdEnvelope = ensure_success(response, "Twitter create tweet")
            .await?
            .json()
            .await
            .map_err(|e| DeliveryError::Rejected(format!("unexpected tweet response: {e}")))?;
        Ok(tweet.data.id)
    }
}
