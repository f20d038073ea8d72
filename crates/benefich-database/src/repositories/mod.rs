//! PostgreSQL implementations of the store traits.

pub mod content;
pub mod notification;
pub mod sharing;
pub mod user;

pub use content::ContentRepository;
pub use notification::NotificationRepository;
pub use sharing::SharingRepository;
pub use user::UserRepository;
