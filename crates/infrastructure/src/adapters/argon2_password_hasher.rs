//! Argon2id password hashing adapter
//!
//! Implements [`PasswordHasherPort`] with Argon2id and PHC-formatted hash
//! strings, so parameters and salt travel with the stored hash.
//!
//! # Examples
//!
//! ```
//! use application::ports::PasswordHasherPort;
//! use infrastructure::adapters::Argon2PasswordHasher;
//!
//! let hasher = Argon2PasswordHasher::new();
//! let hash = hasher.hash("C0rrect-Horse").unwrap();
//!
//! assert!(hasher.verify("C0rrect-Horse", &hash).unwrap());
//! assert!(!hasher.verify("wrong", &hash).unwrap());
//! ```

use application::{error::ApplicationError, ports::PasswordHasherPort};
use argon2::{
    Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::{debug, instrument, warn};

/// Password hasher backed by Argon2id with the crate's default parameters
/// (19 MiB memory, 2 iterations, 1 lane)
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Whether a stored value looks like an Argon2 PHC string
    ///
    /// ```
    /// use infrastructure::adapters::Argon2PasswordHasher;
    ///
    /// assert!(Argon2PasswordHasher::is_hashed("$argon2id$v=19$m=19456,t=2,p=1$..."));
    /// assert!(!Argon2PasswordHasher::is_hashed("hunter2"));
    /// ```
    #[must_use]
    pub fn is_hashed(value: &str) -> bool {
        value.starts_with("$argon2")
    }

    /// Count stored values that are not Argon2 hashes and log a warning if any
    #[must_use]
    pub fn count_unhashed<'a, I>(values: I) -> usize
    where
        I: Iterator<Item = &'a str>,
    {
        let count = values.filter(|v| !Self::is_hashed(v)).count();
        if count > 0 {
            warn!(
                plaintext_count = count,
                "Found password hashes that are not in Argon2 PHC format"
            );
        }
        count
    }
}

impl PasswordHasherPort for Argon2PasswordHasher {
    #[instrument(skip_all)]
    fn hash(&self, password: &str) -> Result<String, ApplicationError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ApplicationError::Internal(format!("Password hashing failed: {e}")))?;

        debug!("Password hashed");
        Ok(hash.to_string())
    }

    #[instrument(skip_all)]
    fn verify(&self, password: &str, hash: &str) -> Result<bool, ApplicationError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            ApplicationError::Internal(format!("Stored password hash is malformed: {e}"))
        })?;

        let matches = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        debug!(matches, "Password verified");

        Ok(matches)
    }
}
