//! # benefich-database
//!
//! The content store consumed by the dispatcher: store traits, PostgreSQL
//! connection management and repositories, and an in-memory store.

pub mod connection;
pub mod repositories;
pub mod schema;
pub mod store;

pub use connection::DatabasePool;
pub use store::{ContentStore, MemoryStore, RecipientStore, ScheduleStore};
