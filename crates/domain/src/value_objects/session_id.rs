//! Session identifier value object

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;
use crate::errors::DomainError;

/// Maximum accepted length of a session identifier
pub const MAX_SESSION_ID_LEN: usize = 512;

/// Length of the random suffix appended to generated session IDs
const RANDOM_SUFFIX_LEN: usize = 9;

/// An opaque session identifier
///
/// Generated IDs have the shape `session_{userId}_{unixMillis}_{suffix}`,
/// which keeps them unique per user, creation instant and random suffix.
/// IDs received from tokens are only checked for being non-blank and bounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing session identifier
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(DomainError::InvalidSessionId(
                "must not be empty".to_string(),
            ));
        }
        if value.len() > MAX_SESSION_ID_LEN {
            return Err(DomainError::InvalidSessionId(format!(
                "must be at most {MAX_SESSION_ID_LEN} bytes"
            )));
        }

        Ok(Self(value))
    }

    /// Generate a fresh session ID for a user at the given instant
    pub fn generate(user_id: &UserId, at: DateTime<Utc>) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        let suffix = &random[..RANDOM_SUFFIX_LEN];
        Self(format!(
            "session_{user_id}_{}_{suffix}",
            at.timestamp_millis()
        ))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SessionId {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}
