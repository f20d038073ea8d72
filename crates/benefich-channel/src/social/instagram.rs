//! Instagram Graph API client.
//!
//! The Graph API fetches images by URL, so each upload is staged in a
//! publicly served directory for the duration of the call.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use benefich_core::config::InstagramConfig;

use super::ensure_success;
use super::transport::SocialTransport;
use crate::error::DeliveryError;

#[derive(Debug, Deserialize)]
struct GraphId {
    id: String,
}

/// Publishes feed photos to an Instagram business account.
pub struct InstagramClient {
    client: Client,
    graph_base: String,
    user_id: String,
    access_token: String,
    public_dir: PathBuf,
    public_url: String,
}

impl std::fmt::Debug for InstagramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstagramClient")
            .field("user_id", &self.user_id)
            .field("public_dir", &self.public_dir)
            .finish_non_exhaustive()
    }
}

impl InstagramClient {
    /// Build a client from the Instagram configuration.
    pub fn new(config: &InstagramConfig) -> Self {
        Self {
            client: Client::new(),
            graph_base: config.graph_base.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            access_token: config.access_token.clone(),
            public_dir: PathBuf::from(&config.public_media_dir),
            public_url: config.public_media_url.trim_end_matches('/').to_string(),
        }
    }

    /// Copy `jpeg` into the public directory. The copy is removed on drop.
    async fn stage(&self, jpeg: &Path) -> Result<(tempfile::TempPath, String), DeliveryError> {
        tokio::fs::create_dir_all(&self.public_dir)
            .await
            .map_err(|e| DeliveryError::Media(format!("cannot create public dir: {e}")))?;

        let staged = tempfile::Builder::new()
            .prefix("ig-")
            .suffix(".jpg")
            .tempfile_in(&self.public_dir)
            .map_err(|e| DeliveryError::Media(format!("cannot stage image: {e}")))?
            .into_temp_path();

        tokio::fs::copy(jpeg, &staged)
            .await
            .map_err(|e| DeliveryError::Media(format!("cannot stage image: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&staged, std::fs::Permissions::from_mode(0o644))
                .await
                .map_err(|e| DeliveryError::Media(format!("cannot publish image: {e}")))?;
        }

        let file_name = staged
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DeliveryError::Media("staged file has no name".to_string()))?;
        let url = format!("{}/{}", self.public_url, file_name);
        Ok((staged, url))
    }
}

#[async_trait]
impl SocialTransport for InstagramClient {
    async fn post_photo(&self, jpeg: &Path, caption: &str) -> Result<String, DeliveryError> {
        let (_staged, image_url) = self.stage(jpeg).await?;

        let response = self
            .client
            .post(format!("{}/{}/media", self.graph_base, self.user_id))
            .form(&[
                ("image_url", image_url.as_str()),
                ("caption", caption),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DeliveryError::ConnectionFailed(e.to_string()))?;
        let container: GraphId = ensure_success(response, "Instagram media container")
            .await?
            .json()
            .await
            .map_err(|e| DeliveryError::Rejected(format!("unexpected container response: {e}")))?;
        debug!(container_id = %container.id, "Created Instagram media container");

        let response = self
            .client
            .post(format!("{}/{}/media_publish", self.graph_base, self.user_id))
            .form(&[
                ("creation_id", container.id.as_str()),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DeliveryError::ConnectionFailed(e.to_string()))?;
        let post: GraphId = ensure_success(response, "Instagram media publish")
            .await?
            .json()
            .await
            .map_err(|e| DeliveryError::Rejected(format!("unexpected publish response: {e}")))?;
        Ok(post.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_exposes_copy_and_removes_it() {
        let public = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("poster.jpg");
        std::fs::write(&source, b"jpeg bytes").unwrap();

        let client = InstagramClient::new(&InstagramConfig {
            enabled: true,
            user_id: "17841400000000000".to_string(),
            access_token: "token".to_string(),
            public_media_dir: public.path().display().to_string(),
            public_media_url: "https://benefi.ch/media/ig/".to_string(),
            ..InstagramConfig::default()
        });

        let (staged, url) = client.stage(&source).await.unwrap();
        let name = staged.file_name().unwrap().to_str().unwrap().to_string();
        assert_eq!(url, format!("https://benefi.ch/media/ig/{name}"));
        assert_eq!(std::fs::read(&staged).unwrap(), b"jpeg bytes");

        let staged_path = staged.to_path_buf();
        drop(staged);
        assert!(!staged_path.exists());
        assert!(source.exists());
    }
}
