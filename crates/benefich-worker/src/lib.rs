//! # benefich-worker
//!
//! Periodic dispatch of scheduled notifications and sharings.
//!
//! A cron tick fires one [`DispatchEngine::run_pass`]. The engine walks its
//! (content kind, channel) pairs in a fixed order; each pair's runner asks a
//! [`DueItemProvider`] for due records, hands them to the channel sender and
//! flips the `sent` flag of every confirmed delivery. Failed deliveries stay
//! pending for the next tick.

pub mod engine;
pub mod guard;
pub mod provider;
pub mod runner;
pub mod scheduler;

#[cfg(test)]
mod test_support;

pub use engine::{DispatchEngine, PassReport, Senders, Stores};
pub use guard::SingleFlight;
pub use provider::DueItemProvider;
pub use runner::{DispatchRunner, NotificationRunner, RunSummary, SharingRunner};
pub use scheduler::DispatchScheduler;
