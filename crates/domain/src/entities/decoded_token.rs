//! Decoded token payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{SessionId, TokenMarker, UserId};

/// Payload of a bearer token that passed every validation step
///
/// Produced per request and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedToken {
    pub user_id: UserId,
    pub session_id: SessionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl DecodedToken {
    /// The marker this token is bound to
    pub fn marker(&self) -> TokenMarker {
        TokenMarker::new(self.user_id.clone(), self.session_id.clone())
    }

    /// Whether the token is past its expiry at the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn token(expires_at: DateTime<Utc>) -> DecodedToken {
        DecodedToken {
            user_id: UserId::new("u1").unwrap(),
            session_id: SessionId::new("s1").unwrap(),
            issued_at: None,
            expires_at,
        }
    }

    #[test]
    fn expiry_is_strictly_after() {
        let now = Utc::now();
        assert!(!token(now).is_expired_at(now));
        assert!(token(now - Duration::seconds(1)).is_expired_at(now));
    }

    #[test]
    fn marker_uses_both_claims() {
        assert_eq!(token(Utc::now()).marker().key(), "u1s1");
    }
}
