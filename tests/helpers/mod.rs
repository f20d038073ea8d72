//! Recording transports and fixtures for the dispatch flow tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use benefich_channel::DeliveryError;
use benefich_channel::email::{MailTransport, OutgoingEmail};
use benefich_channel::push::{PushMessage, PushTransport};
use benefich_channel::social::SocialTransport;
use benefich_core::types::{ContentId, PlaceId};
use benefich_entity::{Content, ContentDetails, Place};

#[derive(Debug, Default)]
pub struct RecordingMail {
    pub batches: Mutex<Vec<Vec<OutgoingEmail>>>,
}

#[async_trait]
impl MailTransport for RecordingMail {
    async fn send_batch(&self, messages: Vec<OutgoingEmail>) -> Result<(), DeliveryError> {
        self.batches.lock().unwrap().push(messages);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingPush {
    pub messages: Mutex<Vec<PushMessage>>,
}

#[async_trait]
impl PushTransport for RecordingPush {
    async fn send(&self, message: &PushMessage) -> Result<(), DeliveryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// A posted photo: the file handed over, whether it existed during the
/// call, and the caption.
#[derive(Debug, Clone)]
pub struct Post {
    pub path: PathBuf,
    pub existed: bool,
    pub caption: String,
}

#[derive(Debug, Default)]
pub struct RecordingSocial {
    pub posts: Mutex<Vec<Post>>,
    pub fail: bool,
}

#[async_trait]
impl SocialTransport for RecordingSocial {
    async fn post_photo(&self, jpeg: &Path, caption: &str) -> Result<String, DeliveryError> {
        let mut posts = self.posts.lock().unwrap();
        posts.push(Post {
            path: jpeg.to_path_buf(),
            existed: jpeg.exists(),
            caption: caption.to_string(),
        });
        if self.fail {
            return Err(DeliveryError::Rejected("media rejected".to_string()));
        }
        Ok(format!("post-{}", posts.len()))
    }
}

pub fn feria(now: DateTime<Utc>, image_path: &str) -> Content {
    let published = now - Duration::hours(1);
    Content {
        id: ContentId(1),
        title: "Feria de emprendimiento".to_string(),
        body: "<p>Stands abiertos todo el día</p>".to_string(),
        author_id: None,
        image_path: Some(image_path.to_string()),
        publish_at: published,
        unpublish_at: None,
        pinned: true,
        created_at: published,
        modified_at: published,
        details: ContentDetails::Event {
            start: now + Duration::days(2),
            end: None,
            place: Some(Place {
                id: PlaceId(42),
                name: "Patio Central".to_string(),
                address: "Beauchef 850".to_string(),
                lat: -33.457,
                lng: -70.663,
            }),
        },
    }
}

/// Write a small PNG into `dir` and return its file name.
pub fn write_png(dir: &Path) -> String {
    let name = "feria.png";
    image::RgbImage::from_pixel(16, 16, image::Rgb([200, 30, 30]))
        .save(dir.join(name))
        .unwrap();
    name.to_string()
}

/// Number of entries in `dir`.
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
