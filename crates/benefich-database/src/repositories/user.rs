//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use benefich_core::error::{AppError, ErrorKind};
use benefich_core::result::AppResult;
use benefich_entity::Recipient;

use crate::store::RecipientStore;

/// Repository for registered users.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientStore for UserRepository {
    async fn list_recipients(&self) -> AppResult<Vec<Recipient>> {
        sqlx::query_as::<_, Recipient>(
            "SELECT id, email, display_name FROM users \
             WHERE is_active = TRUE AND email <> '' ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list recipients", e))
    }
}
