//! Delivery channel enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Channel of a scheduled notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_channel", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationChannel {
    /// Email to every registered user.
    Email,
    /// Mobile push broadcast to a topic.
    Mobile,
}

impl NotificationChannel {
    /// Return the channel as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Mobile => "MOBILE",
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Channel of a scheduled sharing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sharing_channel", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SocialChannel {
    /// Photo tweet.
    Twitter,
    /// Instagram feed post.
    Instagram,
}

impl SocialChannel {
    /// Return the channel as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twitter => "TWITTER",
            Self::Instagram => "INSTAGRAM",
        }
    }
}

impl fmt::Display for SocialChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Any dispatch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    /// See [`NotificationChannel::Email`].
    Email,
    /// See [`NotificationChannel::Mobile`].
    Mobile,
    /// See [`SocialChannel::Twitter`].
    Twitter,
    /// See [`SocialChannel::Instagram`].
    Instagram,
}

impl Channel {
    /// Return the channel as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Mobile => "MOBILE",
            Self::Twitter => "TWITTER",
            Self::Instagram => "INSTAGRAM",
        }
    }
}

impl From<NotificationChannel> for Channel {
    fn from(channel: NotificationChannel) -> Self {
        match channel {
            NotificationChannel::Email => Self::Email,
            NotificationChannel::Mobile => Self::Mobile,
        }
    }
}

impl From<SocialChannel> for Channel {
    fn from(channel: SocialChannel) -> Self {
        match channel {
            SocialChannel::Twitter => Self::Twitter,
            SocialChannel::Instagram => Self::Instagram,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EMAIL" => Ok(Self::Email),
            "MOBILE" => Ok(Self::Mobile),
            "TWITTER" => Ok(Self::Twitter),
            "INSTAGRAM" => Ok(Self::Instagram),
            other => Err(format!("unknown channel '{other}'")),
        }
    }
}
