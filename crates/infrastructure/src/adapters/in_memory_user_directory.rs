//! In-memory user directory
//!
//! Stand-in for the entity layer when the server runs on its own: accounts
//! are seeded from configuration at start-up and password changes are kept
//! in memory only.

use std::collections::HashMap;

use application::{error::ApplicationError, ports::UserDirectoryPort};
use async_trait::async_trait;
use domain::{EmailAddress, UserAccount, UserId};
use parking_lot::RwLock;
use tracing::info;

/// Process-local implementation of [`UserDirectoryPort`]
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserAccount>>,
}

impl InMemoryUserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory holding the given accounts
    #[must_use]
    pub fn with_users(accounts: impl IntoIterator<Item = UserAccount>) -> Self {
        let directory = Self::new();
        for account in accounts {
            directory.insert(account);
        }
        directory
    }

    /// Insert or replace an account
    pub fn insert(&self, account: UserAccount) {
        self.users.write().insert(account.id.clone(), account);
    }

    /// Mark an account as soft-deleted, returning whether it existed
    pub fn deactivate(&self, id: &UserId) -> bool {
        match self.users.write().get_mut(id) {
            Some(account) => {
                account.is_deleted = true;
                true
            },
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserDirectoryPort for InMemoryUserDirectory {
    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, ApplicationError> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, ApplicationError> {
        Ok(self
            .users
            .read()
            .values()
            .find(|account| &account.email == email)
            .cloned())
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), ApplicationError> {
        let mut users = self.users.write();
        let account = users
            .get_mut(id)
            .ok_or(ApplicationError::UserNotFound)?;
        account.password_hash = password_hash.to_string();
        drop(users);

        info!(user_id = %id, "Password hash updated");
        Ok(())
    }
}
