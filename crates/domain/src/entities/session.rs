//! Session entity - One authenticated login instance

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{SessionId, TokenMarker, UserId};

/// Server-side record of an authenticated login instance
///
/// A session belongs to exactly one user. It is created on login, token
/// refresh or password change and destroyed on logout, explicit
/// invalidation or password change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: SessionId,
    /// Owning user
    pub user_id: UserId,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Start a new session for a user with a freshly generated ID
    pub fn start(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::generate(&user_id, now),
            user_id,
            created_at: now,
        }
    }

    /// Rebuild a session from known parts
    pub const fn with_id(id: SessionId, user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            created_at,
        }
    }

    /// The token marker belonging to this session
    pub fn marker(&self) -> TokenMarker {
        TokenMarker::new(self.user_id.clone(), self.id.clone())
    }

    /// Whether this session is owned by the given user
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
