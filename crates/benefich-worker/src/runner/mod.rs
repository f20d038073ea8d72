//! Dispatch runners, one per (content kind, channel) pair.

pub mod notification;
pub mod sharing;

use std::ops::AddAssign;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use benefich_core::result::AppResult;
use benefich_core::traits::{ErrorReporter, FailureScope};
use benefich_entity::{Channel, ContentKind};

pub use notification::NotificationRunner;
pub use sharing::SharingRunner;

/// Counts produced by one runner invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records returned by the provider.
    pub due: usize,
    /// Records whose flag this run flipped.
    pub delivered: usize,
    /// Records left pending after a reported failure.
    pub failed: usize,
    /// Records delivered but whose flag could not be written.
    pub unconfirmed: usize,
}

impl AddAssign for RunSummary {
    fn add_assign(&mut self, other: Self) {
        self.due += other.due;
        self.delivered += other.delivered;
        self.failed += other.failed;
        self.unconfirmed += other.unconfirmed;
    }
}

/// Delivers the due records of one (content kind, channel) pair.
#[async_trait]
pub trait DispatchRunner: Send + Sync + std::fmt::Debug {
    /// Content kind handled by this runner.
    fn kind(&self) -> ContentKind;

    /// Channel handled by this runner.
    fn channel(&self) -> Channel;

    /// Process everything due at `now`.
    ///
    /// Failures tied to one record (content lookup, delivery, mark-as-sent)
    /// are reported and counted; only errors that stop the whole pair, such
    /// as the due query failing, are returned.
    async fn run(&self, now: DateTime<Utc>) -> AppResult<RunSummary>;
}

pub(crate) fn report(
    reporter: &dyn ErrorReporter,
    kind: ContentKind,
    channel: Channel,
    record_id: Option<i64>,
    error: &(dyn std::error::Error + 'static),
) {
    reporter.capture(
        FailureScope {
            kind: kind.as_str(),
            channel: channel.as_str(),
            record_id,
        },
        error,
    );
}
