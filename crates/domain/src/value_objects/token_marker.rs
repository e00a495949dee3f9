//! Token validity marker

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{SessionId, UserId};

/// Composite key flagging that a user+session pair holds a valid token
///
/// The marker is a validity flag, never a credential. Its string form is the
/// plain concatenation `userId + sessionId`, which is what gets logged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenMarker {
    user_id: UserId,
    session_id: SessionId,
}

impl TokenMarker {
    /// Build the marker for a user and one of their sessions
    pub const fn new(user_id: UserId, session_id: SessionId) -> Self {
        Self {
            user_id,
            session_id,
        }
    }

    /// The user half of the key
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The session half of the key
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The flat key form (`userId + sessionId`)
    pub fn key(&self) -> String {
        format!("{}{}", self.user_id, self.session_id)
    }
}

impl fmt::Display for TokenMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.user_id, self.session_id)
    }
}
