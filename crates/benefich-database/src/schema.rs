//! Content store schema bootstrap.

use sqlx::PgPool;
use tracing::info;

use benefich_core::error::{AppError, ErrorKind};

/// Apply the bundled content store schema if it is not there yet.
pub async fn apply_schema(pool: &PgPool) -> Result<(), AppError> {
    info!("Applying content store schema");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to apply schema: {e}"),
                e,
            )
        })?;

    info!("Content store schema is up to date");
    Ok(())
}
