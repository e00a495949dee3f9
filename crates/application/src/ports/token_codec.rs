//! Token codec port
//!
//! Signing and verification of bearer tokens is delegated to an adapter.
//! The codec only checks the signature and shape; expiry and session state
//! are judged by the token validator so each failure gets its own error.

use chrono::{DateTime, Utc};
use domain::{SessionId, UserId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Claims as they came out of a verified token
///
/// Every field is optional: a correctly signed token can still be missing
/// claims, and the validator decides what that means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTokenClaims {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    /// Issued-at, seconds since the Unix epoch
    pub issued_at: Option<i64>,
    /// Expiry, seconds since the Unix epoch
    pub expires_at: Option<i64>,
}

/// A freshly minted bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub session_id: SessionId,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Seconds until expiry, clamped at zero
    pub fn expires_in(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((self.expires_at - now).num_seconds()).unwrap_or(0)
    }
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("session_id", &self.session_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Port for decoding and minting bearer tokens
#[cfg_attr(test, automock)]
pub trait TokenCodecPort: Send + Sync {
    /// Verify a token's signature and return its claims
    ///
    /// Fails with [`ApplicationError::InvalidToken`] when the token is
    /// malformed or the signature does not verify.
    fn decode(&self, token: &str) -> Result<RawTokenClaims, ApplicationError>;

    /// Sign a token carrying `userId` and `sessionId`
    fn mint(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
    ) -> Result<IssuedToken, ApplicationError>;
}
