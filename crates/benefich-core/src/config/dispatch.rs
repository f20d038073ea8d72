//! Dispatch scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Periodic dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Whether `serve` registers the cron job at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (seconds first).
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// Upper bound for a single outbound delivery call.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_seconds: u64,
    /// Run one pass immediately when `serve` starts.
    #[serde(default)]
    pub run_on_start: bool,
}

impl DispatchConfig {
    /// The per-attempt timeout as a [`Duration`].
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_seconds)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: default_schedule(),
            attempt_timeout_seconds: default_attempt_timeout(),
            run_on_start: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "0 * * * * *".to_string()
}

fn default_attempt_timeout() -> u64 {
    30
}
