//! User directory port
//!
//! The entity layer owns user records; this layer only looks users up and
//! stores new password hashes.

use async_trait::async_trait;
use domain::{EmailAddress, UserAccount, UserId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for user lookups against the entity layer
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserDirectoryPort: Send + Sync {
    /// Find a user by ID, including soft-deleted users
    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, ApplicationError>;

    /// Find a user by login email
    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, ApplicationError>;

    /// Replace a user's password hash
    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), ApplicationError>;
}
