//! The dispatch engine: every configured pair, once per pass.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use benefich_channel::{NotificationSender, SharingSender};
use benefich_core::traits::ErrorReporter;
use benefich_database::{ContentStore, RecipientStore, ScheduleStore};
use benefich_entity::{Channel, ContentKind, Notification, Sharing};

use crate::guard::{PairKey, SingleFlight};
use crate::runner::{DispatchRunner, NotificationRunner, RunSummary, SharingRunner, report};

/// Store handles used by the runners.
#[derive(Debug, Clone)]
pub struct Stores {
    pub contents: Arc<dyn ContentStore>,
    pub notifications: Arc<dyn ScheduleStore<Notification>>,
    pub sharings: Arc<dyn ScheduleStore<Sharing>>,
    pub recipients: Arc<dyn RecipientStore>,
}

impl Stores {
    /// Use one store for every role.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: ContentStore + ScheduleStore<Notification> + ScheduleStore<Sharing> + RecipientStore,
    {
        Self {
            contents: store.clone(),
            notifications: store.clone(),
            sharings: store.clone(),
            recipients: store,
        }
    }
}

/// Senders of the enabled channels. `None` leaves the channel out.
#[derive(Debug, Clone, Default)]
pub struct Senders {
    pub email: Option<Arc<dyn NotificationSender>>,
    pub push: Option<Arc<dyn NotificationSender>>,
    pub twitter: Option<Arc<dyn SharingSender>>,
    pub instagram: Option<Arc<dyn SharingSender>>,
}

/// Outcome of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Pairs whose runner completed.
    pub ran: usize,
    /// Pairs skipped because a previous run was still in flight.
    pub skipped: usize,
    /// Pairs aborted by a store error.
    pub store_errors: usize,
    /// Totals over the completed runs.
    pub totals: RunSummary,
}

/// Runs the dispatch pairs in a fixed order.
#[derive(Debug)]
pub struct DispatchEngine {
    runners: Vec<Arc<dyn DispatchRunner>>,
    guard: SingleFlight,
    reporter: Arc<dyn ErrorReporter>,
}

impl DispatchEngine {
    /// Register the pairs of every enabled channel.
    ///
    /// Notifications come first (each kind on EMAIL then MOBILE), followed
    /// by sharings (each kind on TWITTER then INSTAGRAM).
    pub fn new(stores: Stores, senders: Senders, reporter: Arc<dyn ErrorReporter>) -> Self {
        let mut runners: Vec<Arc<dyn DispatchRunner>> = Vec::new();

        for kind in ContentKind::ALL {
            for sender in [&senders.email, &senders.push].into_iter().flatten() {
                runners.push(Arc::new(NotificationRunner::new(
                    kind,
                    Arc::clone(&stores.notifications),
                    Arc::clone(&stores.contents),
                    Arc::clone(&stores.recipients),
                    Arc::clone(sender),
                    Arc::clone(&reporter),
                )));
            }
        }
        for kind in ContentKind::ALL {
            for sender in [&senders.twitter, &senders.instagram].into_iter().flatten() {
                runners.push(Arc::new(SharingRunner::new(
                    kind,
                    Arc::clone(&stores.sharings),
                    Arc::clone(&stores.contents),
                    Arc::clone(sender),
                    Arc::clone(&reporter),
                )));
            }
        }

        for runner in &runners {
            tracing::info!(
                kind = %runner.kind(),
                channel = %runner.channel(),
                "Registered dispatch pair"
            );
        }

        Self {
            runners,
            guard: SingleFlight::new(),
            reporter,
        }
    }

    /// Registered pairs in run order.
    pub fn pairs(&self) -> Vec<PairKey> {
        self.runners
            .iter()
            .map(|r| (r.kind(), r.channel()))
            .collect()
    }

    /// Run one pass against the current time.
    pub async fn run_pass(&self) -> PassReport {
        self.run_pass_at(Utc::now()).await
    }

    /// Run every pair sequentially against `now`.
    ///
    /// A store error aborts only the pair that hit it.
    pub async fn run_pass_at(&self, now: DateTime<Utc>) -> PassReport {
        let mut pass = PassReport::default();

        for runner in &self.runners {
            let (kind, channel) = (runner.kind(), runner.channel());
            let Some(_permit) = self.guard.try_acquire((kind, channel)) else {
                tracing::info!(
                    kind = %kind,
                    channel = %channel,
                    "Previous run still in flight, skipping"
                );
                pass.skipped += 1;
                continue;
            };

            match runner.run(now).await {
                Ok(summary) => {
                    pass.ran += 1;
                    pass.totals += summary;
                }
                Err(err) => {
                    report(self.reporter.as_ref(), kind, channel, None, &err);
                    pass.store_errors += 1;
                }
            }
        }

        tracing::debug!(
            ran = pass.ran,
            skipped = pass.skipped,
            store_errors = pass.store_errors,
            delivered = pass.totals.delivered,
            failed = pass.totals.failed,
            unconfirmed = pass.totals.unconfirmed,
            "Dispatch pass finished"
        );
        pass
    }

    /// Whether `channel` has at least one registered pair.
    pub fn serves(&self, channel: Channel) -> bool {
        self.runners.iter().any(|r| r.channel() == channel)
    }
}
