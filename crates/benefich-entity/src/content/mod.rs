//! Content items (events, news, benefits) and their derived views.

pub mod field;
pub mod kind;
pub mod model;
pub mod publication;

pub use field::ContentField;
pub use kind::ContentKind;
pub use model::{Content, ContentDetails, Place};
pub use publication::{ChannelCount, DeliverySummary, PublicationState};
