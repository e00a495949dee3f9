//! Password hashing port

#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for one-way password hashing
#[cfg_attr(test, automock)]
pub trait PasswordHasherPort: Send + Sync {
    /// Hash a plaintext password into a self-describing hash string
    fn hash(&self, password: &str) -> Result<String, ApplicationError>;

    /// Check a plaintext password against a stored hash
    ///
    /// A mismatch is `Ok(false)`; only a malformed hash is an error.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, ApplicationError>;
}
