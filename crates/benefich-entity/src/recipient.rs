//! Notification recipient.

use benefich_core::types::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user that receives email notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Recipient {
    /// User identifier.
    pub id: UserId,
    /// Delivery address.
    pub email: String,
    /// Display name, if known.
    pub display_name: Option<String>,
}

impl Recipient {
    /// Whether the address looks deliverable.
    pub fn has_address(&self) -> bool {
        let email = self.email.trim();
        !email.is_empty() && email.contains('@')
    }
}
