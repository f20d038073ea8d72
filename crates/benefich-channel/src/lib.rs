//! # benefich-channel
//!
//! Channel senders used by the dispatch runners:
//!
//! - [`email::EmailSender`]: one HTML message per due notification, all
//!   handed to the mail transport in a single batch.
//! - [`push::PushSender`]: one topic broadcast per due notification.
//! - [`social::SocialSender`]: one photo post per due sharing, on Twitter
//!   or Instagram.
//!
//! Every outbound call is bounded by a per-attempt timeout and failures are
//! returned as [`DeliveryError`]; nothing here touches the content store.

pub mod email;
pub mod error;
pub mod push;
pub mod sender;
pub mod social;
pub mod template;

#[cfg(test)]
mod test_support;

pub use error::DeliveryError;
pub use sender::{Confirmations, DueItem, NotificationSender, SharingSender};
pub use template::TemplateRenderer;
