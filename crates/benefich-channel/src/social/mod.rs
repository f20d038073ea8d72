//! Twitter and Instagram publishing.

pub mod instagram;
pub mod media;
pub mod transport;
pub mod twitter;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use tracing::info;

use benefich_entity::{Sharing, SocialChannel};

use crate::error::{DeliveryError, with_timeout};
use crate::sender::{DueItem, SharingSender};

pub use instagram::InstagramClient;
pub use media::{MediaNormalizer, PreparedMedia};
pub use transport::SocialTransport;
pub use twitter::TwitterClient;

/// Turn a non-2xx response into a [`DeliveryError`].
pub(crate) async fn ensure_success(
    response: Response,
    call: &str,
) -> Result<Response, DeliveryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = format!("{call} returned {status}: {body}");
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(DeliveryError::AuthenticationFailed(detail))
    } else {
        Err(DeliveryError::Rejected(detail))
    }
}

/// Publishes one due sharing as a photo post.
pub struct SocialSender {
    channel: SocialChannel,
    transport: Arc<dyn SocialTransport>,
    media: MediaNormalizer,
    timeout: Duration,
}

impl std::fmt::Debug for SocialSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialSender")
            .field("channel", &self.channel)
            .field("media", &self.media)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SocialSender {
    /// Wrap `transport` as the publisher for `channel`.
    pub fn new(
        channel: SocialChannel,
        transport: Arc<dyn SocialTransport>,
        media: MediaNormalizer,
        timeout: Duration,
    ) -> Self {
        Self {
            channel,
            transport,
            media,
            timeout,
        }
    }
}

#[async_trait]
impl SharingSender for SocialSender {
    fn channel(&self) -> SocialChannel {
        self.channel
    }

    async fn publish(&self, item: &DueItem<Sharing>) -> Result<(), DeliveryError> {
        let image_path = item
            .content
            .image_path
            .as_deref()
            .ok_or_else(|| DeliveryError::Media("content has no image".to_string()))?;

        // Dropping `media` removes a converted copy, whatever the outcome.
        let media = self.media.prepare(image_path).await?;
        let caption = item.record.caption(&item.content.title);

        let post_id =
            with_timeout(self.timeout, self.transport.post_photo(media.path(), caption)).await?;

        info!(
            channel = %self.channel,
            sharing_id = %item.record.id,
            post_id = %post_id,
            "Sharing published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::transport::MockSocialTransport;
    use crate::test_support::{event, sharing};
    use benefich_core::config::SocialConfig;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct Fixture {
        root: tempfile::TempDir,
        scratch: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            std::fs::create_dir_all(root.path().join("images")).unwrap();
            image::RgbImage::new(16, 16)
                .save(root.path().join("images/feria.png"))
                .unwrap();
            Self {
                root,
                scratch: tempfile::tempdir().unwrap(),
            }
        }

        fn media(&self) -> MediaNormalizer {
            MediaNormalizer::new(&SocialConfig {
                media_root: self.root.path().display().to_string(),
                scratch_dir: self.scratch.path().display().to_string(),
                ..SocialConfig::default()
            })
        }

        fn scratch_is_empty(&self) -> bool {
            std::fs::read_dir(self.scratch.path()).unwrap().next().is_none()
        }
    }

    fn recording_transport(
        seen: Arc<Mutex<Vec<(PathBuf, String)>>>,
        outcome: fn() -> Result<String, DeliveryError>,
    ) -> MockSocialTransport {
        let mut transport = MockSocialTransport::new();
        transport
            .expect_post_photo()
            .times(1)
            .returning(move |path: &Path, caption: &str| {
                assert!(path.exists(), "converted file must exist during the call");
                seen.lock()
                    .unwrap()
                    .push((path.to_path_buf(), caption.to_string()));
                outcome()
            });
        transport
    }

    #[tokio::test]
    async fn test_png_converted_once_and_removed_after_success() {
        let fixture = Fixture::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = recording_transport(seen.clone(), || Ok("1845".to_string()));
        let sender = SocialSender::new(
            SocialChannel::Twitter,
            Arc::new(transport),
            fixture.media(),
            Duration::from_secs(5),
        );

        let content = event(1, "Feria de Clubes", 42);
        let item = sharing(5, &content, SocialChannel::Twitter, None);
        sender.publish(&item).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, caption) = &seen[0];
        assert_eq!(path.extension().unwrap(), "jpg");
        assert_eq!(caption, "Feria de Clubes");
        assert!(!path.exists());
        assert!(fixture.scratch_is_empty());
    }

    #[tokio::test]
    async fn test_png_removed_after_failure() {
        let fixture = Fixture::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = recording_transport(seen.clone(), || {
            Err(DeliveryError::Rejected("Twitter create tweet returned 403".to_string()))
        });
        let sender = SocialSender::new(
            SocialChannel::Twitter,
            Arc::new(transport),
            fixture.media(),
            Duration::from_secs(5),
        );

        let content = event(1, "Feria de Clubes", 42);
        let item = sharing(5, &content, SocialChannel::Twitter, Some("¡Ven a la feria!"));
        let err = sender.publish(&item).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Rejected(_)));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, "¡Ven a la feria!");
        assert!(!seen[0].0.exists());
        assert!(fixture.scratch_is_empty());
    }

    #[tokio::test]
    async fn test_content_without_image_is_not_posted() {
        let fixture = Fixture::new();
        let mut transport = MockSocialTransport::new();
        transport.expect_post_photo().times(0);
        let sender = SocialSender::new(
            SocialChannel::Instagram,
            Arc::new(transport),
            fixture.media(),
            Duration::from_secs(5),
        );

        let mut content = event(1, "Feria de Clubes", 42);
        content.image_path = None;
        let item = sharing(5, &content, SocialChannel::Instagram, None);
        let err = sender.publish(&item).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Media(_)));
    }
}
