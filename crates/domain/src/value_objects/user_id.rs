//! User identifier value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Maximum accepted length of a user identifier
pub const MAX_USER_ID_LEN: usize = 255;

/// A user identifier as issued by the entity layer
///
/// The format is owned by the entity layer (e.g. `"u1"` or a UUID string),
/// so it is kept opaque here. It only has to be non-blank, bounded and
/// free of control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a user ID, validating the raw value
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(DomainError::InvalidUserId("must not be empty".to_string()));
        }
        if value.len() > MAX_USER_ID_LEN {
            return Err(DomainError::InvalidUserId(format!(
                "must be at most {MAX_USER_ID_LEN} bytes"
            )));
        }
        if value.chars().any(char::is_control) {
            return Err(DomainError::InvalidUserId(
                "must not contain control characters".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for UserId {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
