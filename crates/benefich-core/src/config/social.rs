//! Twitter and Instagram publishing configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Social publishing settings shared by both networks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// Directory for converted JPEG files.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,
    /// Root that relative content image paths resolve against.
    #[serde(default = "default_media_root")]
    pub media_root: String,
    /// JPEG encoder quality, 1-100.
    #[serde(default = "default_quality")]
    pub jpeg_quality: u8,
    /// Twitter account.
    #[serde(default)]
    pub twitter: TwitterConfig,
    /// Instagram business account.
    #[serde(default)]
    pub instagram: InstagramConfig,
}

/// Twitter API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    /// Whether the TWITTER channel is dispatched.
    #[serde(default)]
    pub enabled: bool,
    /// OAuth 2.0 user-context access token with `tweet.write` and `media.write`.
    #[serde(default)]
    pub access_token: String,
    /// API base URL.
    #[serde(default = "default_twitter_api")]
    pub api_base: String,
}

/// Instagram Graph API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    /// Whether the INSTAGRAM channel is dispatched.
    #[serde(default)]
    pub enabled: bool,
    /// Instagram business user id.
    #[serde(default)]
    pub user_id: String,
    /// Long-lived page access token.
    #[serde(default)]
    pub access_token: String,
    /// Graph API base URL including version.
    #[serde(default = "default_graph_api")]
    pub graph_base: String,
    /// Directory served at `public_media_url`; images are staged here.
    #[serde(default)]
    pub public_media_dir: String,
    /// Public URL prefix of `public_media_dir`.
    #[serde(default)]
    pub public_media_url: String,
}

impl SocialConfig {
    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AppError::configuration(
                "social.jpeg_quality must be between 1 and 100",
            ));
        }
        if self.twitter.enabled {
            super::require("social.twitter", "access_token", &self.twitter.access_token)?;
        }
        if self.instagram.enabled {
            let ig = &self.instagram;
            super::require("social.instagram", "user_id", &ig.user_id)?;
            super::require("social.instagram", "access_token", &ig.access_token)?;
            super::require("social.instagram", "public_media_dir", &ig.public_media_dir)?;
            super::require("social.instagram", "public_media_url", &ig.public_media_url)?;
        }
        Ok(())
    }
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            media_root: default_media_root(),
            jpeg_quality: default_quality(),
            twitter: TwitterConfig::default(),
            instagram: InstagramConfig::default(),
        }
    }
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            access_token: String::new(),
            api_base: default_twitter_api(),
        }
    }
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            user_id: String::new(),
            access_token: String::new(),
            graph_base: default_graph_api(),
            public_media_dir: String::new(),
            public_media_url: String::new(),
        }
    }
}

fn default_scratch_dir() -> String {
    "./data/tmp/social".to_string()
}

fn default_media_root() -> String {
    "./media".to_string()
}

fn default_quality() -> u8 {
    90
}

fn default_twitter_api() -> String {
    "https://api.x.com".to_string()
}

fn default_graph_api() -> String {
    "https://graph.facebook.com/v21.0".to_string()
}
