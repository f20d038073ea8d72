//! Publication state and the admin status label.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::channel::Channel;

/// Visibility of a content item at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PublicationState {
    /// Not yet visible; whole days until `publish_at`.
    Scheduled {
        /// Whole days remaining, truncated.
        days_left: i64,
    },
    /// Visible.
    Published,
    /// Past `unpublish_at`.
    Finished,
}

impl fmt::Display for PublicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished => write!(f, "Publicación finalizada"),
            Self::Published => write!(f, "Publicado"),
            Self::Scheduled { days_left: 1 } => write!(f, "Por publicar (queda 1 día)"),
            Self::Scheduled { days_left } => write!(f, "Por publicar (quedan {days_left} días)"),
        }
    }
}

/// Scheduled and delivered records for one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCount {
    /// Records scheduled on the channel.
    pub total: u64,
    /// Records already sent.
    pub sent: u64,
}

/// Per-channel delivery counts of one content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySummary {
    /// EMAIL notifications.
    pub email: ChannelCount,
    /// MOBILE notifications.
    pub mobile: ChannelCount,
    /// TWITTER sharings.
    pub twitter: ChannelCount,
    /// INSTAGRAM sharings.
    pub instagram: ChannelCount,
}

impl DeliverySummary {
    /// Mutable access to the counter of `channel`.
    pub fn count_mut(&mut self, channel: Channel) -> &mut ChannelCount {
        match channel {
            Channel::Email => &mut self.email,
            Channel::Mobile => &mut self.mobile,
            Channel::Twitter => &mut self.twitter,
            Channel::Instagram => &mut self.instagram,
        }
    }

    /// Tally one record.
    pub fn record(&mut self, channel: Channel, sent: bool) {
        let count = self.count_mut(channel);
        count.total += 1;
        if sent {
            count.sent += 1;
        }
    }

    /// Render the status line shown to editors, e.g. `📌 Publicado 🔔1 @2`.
    ///
    /// A channel marker appears only when the item has records on it.
    pub fn label(&self, state: PublicationState, pinned: bool) -> String {
        let mut label = String::new();
        if pinned {
            label.push_str("📌 ");
        }
        label.push_str(&state.to_string());

        let markers = [
            ("🔔", self.mobile),
            ("@", self.email),
            ("🕊", self.twitter),
            ("⧇", self.instagram),
        ];
        for (marker, count) in markers {
            if count.total > 0 {
                label.push_str(&format!(" {marker}{}", count.sent));
            }
        }
        label
    }
}
