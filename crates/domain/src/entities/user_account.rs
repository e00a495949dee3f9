//! User account as seen by the security layer

use serde::{Deserialize, Serialize};

use crate::value_objects::{EmailAddress, UserId};

/// The slice of a user record this layer needs from the entity layer
#[derive(Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// User identifier
    pub id: UserId,
    /// Login email
    pub email: EmailAddress,
    /// Password hash in PHC string format
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Soft-delete flag
    #[serde(default)]
    pub is_deleted: bool,
}

impl UserAccount {
    /// Create an active account
    pub fn new(id: UserId, email: EmailAddress, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            email,
            password_hash: password_hash.into(),
            is_deleted: false,
        }
    }

    /// Mark the account as soft-deleted
    #[must_use]
    pub const fn deactivated(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// Whether the account may authenticate
    pub const fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("is_deleted", &self.is_deleted)
            .finish()
    }
}
