//! # benefich-entity
//!
//! Domain entity models for the BenefiCh dispatcher. Every struct in this
//! crate represents a row of the content store or a domain value object.
//! Database entities implement `sqlx::FromRow` for PostgreSQL rows.

pub mod channel;
pub mod content;
pub mod recipient;
pub mod schedule;

pub use channel::{Channel, NotificationChannel, SocialChannel};
pub use content::{
    ChannelCount, Content, ContentDetails, ContentField, ContentKind, DeliverySummary, Place,
    PublicationState,
};
pub use recipient::Recipient;
pub use schedule::{Notification, Schedule, Scheduled, Sharing};
