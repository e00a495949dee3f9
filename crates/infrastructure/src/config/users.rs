//! Seed accounts for the in-memory user directory.

use domain::{DomainError, EmailAddress, UserAccount, UserId};
use serde::{Deserialize, Serialize};

/// An account loaded into the user directory at start-up
///
/// ```toml
/// [[users]]
/// id = "u1"
/// email = "owner@example.com"
/// password_hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct SeedUserConfig {
    pub id: String,
    pub email: String,
    /// Argon2id hash in PHC format
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl SeedUserConfig {
    /// Validate into a domain account
    pub fn to_account(&self) -> Result<UserAccount, DomainError> {
        Ok(UserAccount::new(
            UserId::new(self.id.clone())?,
            EmailAddress::new(self.email.as_str())?,
            self.password_hash.clone(),
        ))
    }
}

impl std::fmt::Debug for SeedUserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUserConfig")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}
