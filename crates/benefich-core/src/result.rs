//! Convenience result type alias for BenefiCh.

use crate::error::AppError;

/// A specialized `Result` type for BenefiCh operations.
pub type AppResult<T> = Result<T, AppError>;
