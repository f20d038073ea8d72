//! Delivery failure reporting.
//!
//! Failed deliveries are never fatal: the record stays pending and the
//! failure is handed to an [`ErrorReporter`]. The default reporter emits a
//! structured `tracing` event; an external error tracker can be plugged in
//! by implementing the trait.

use std::fmt;

/// Where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureScope<'a> {
    /// Content kind, e.g. `event`.
    pub kind: &'a str,
    /// Channel, e.g. `TWITTER`.
    pub channel: &'a str,
    /// Child record id, when the failure concerns a single record.
    pub record_id: Option<i64>,
}

impl fmt::Display for FailureScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record_id {
            Some(id) => write!(f, "{}/{}#{}", self.kind, self.channel, id),
            None => write!(f, "{}/{}", self.kind, self.channel),
        }
    }
}

/// Sink for delivery and store failures.
pub trait ErrorReporter: Send + Sync + fmt::Debug + 'static {
    /// Record a failure. Must not panic.
    fn capture(&self, scope: FailureScope<'_>, error: &(dyn std::error::Error + 'static));
}

/// Reporter that logs failures at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn capture(&self, scope: FailureScope<'_>, error: &(dyn std::error::Error + 'static)) {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        tracing::error!(
            kind = scope.kind,
            channel = scope.channel,
            record_id = ?scope.record_id,
            error = %error,
            causes = ?causes,
            "Dispatch failure"
        );
    }
}
