//! Collaborator traits defined in `benefich-core` and implemented elsewhere.

pub mod reporter;

pub use reporter::{ErrorReporter, FailureScope, TracingReporter};
