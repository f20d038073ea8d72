//! Cron trigger for dispatch passes.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use benefich_core::error::AppError;

use crate::engine::DispatchEngine;

/// Fires [`DispatchEngine::run_pass`] on a cron schedule.
///
/// Overlapping ticks are allowed; the engine's single-flight guard skips
/// any pair that is still running from an earlier tick.
pub struct DispatchScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for DispatchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchScheduler").finish()
    }
}

impl DispatchScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler })
    }

    /// Run a dispatch pass of `engine` on every `schedule` tick.
    pub async fn register(
        &self,
        engine: Arc<DispatchEngine>,
        schedule: &str,
    ) -> Result<(), AppError> {
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let engine = Arc::clone(&engine);
            Box::pin(async move {
                tracing::debug!("Dispatch tick");
                let pass = engine.run_pass().await;
                if pass.totals.due > 0 || pass.store_errors > 0 || pass.skipped > 0 {
                    tracing::info!(
                        due = pass.totals.due,
                        delivered = pass.totals.delivered,
                        failed = pass.totals.failed,
                        unconfirmed = pass.totals.unconfirmed,
                        skipped = pass.skipped,
                        store_errors = pass.store_errors,
                        "Dispatch tick finished"
                    );
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid dispatch schedule '{}': {}", schedule, e))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add dispatch job: {}", e)))?;

        tracing::info!(schedule = %schedule, "Dispatch job registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Senders, Stores};
    use crate::test_support::RecordingReporter;
    use benefich_core::error::ErrorKind;
    use benefich_database::MemoryStore;

    fn engine() -> Arc<DispatchEngine> {
        Arc::new(DispatchEngine::new(
            Stores::shared(Arc::new(MemoryStore::new())),
            Senders::default(),
            Arc::new(RecordingReporter::default()),
        ))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_invalid_schedule_is_a_configuration_error() {
        let scheduler = DispatchScheduler::new().await.unwrap();
        let err = scheduler.register(engine(), "every minute").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_default_schedule_registers() {
        let scheduler = DispatchScheduler::new().await.unwrap();
        scheduler.register(engine(), "0 * * * * *").await.unwrap();
    }
}
