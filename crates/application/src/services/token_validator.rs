//! Token validation - Turns a bearer token into a trusted payload
//!
//! Checks run in a fixed order and stop at the first failure:
//! signature and shape, required claims, expiry, session state, token
//! marker and finally the user record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::{DecodedToken, SessionId, UserId};
use tracing::{debug, instrument};

use crate::{
    error::ApplicationError,
    ports::{RawTokenClaims, SessionStorePort, TokenCodecPort, UserDirectoryPort},
};

/// Validates bearer tokens against the codec, the session store and the
/// user directory
pub struct TokenValidator {
    codec: Arc<dyn TokenCodecPort>,
    store: Arc<dyn SessionStorePort>,
    users: Arc<dyn UserDirectoryPort>,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator").finish_non_exhaustive()
    }
}

impl TokenValidator {
    /// Create a new token validator
    pub fn new(
        codec: Arc<dyn TokenCodecPort>,
        store: Arc<dyn SessionStorePort>,
        users: Arc<dyn UserDirectoryPort>,
    ) -> Self {
        Self {
            codec,
            store,
            users,
        }
    }

    /// Validate a token against the current time
    #[instrument(skip_all)]
    pub async fn validate_token(&self, token: &str) -> Result<DecodedToken, ApplicationError> {
        self.validate_token_at(token, Utc::now()).await
    }

    /// Validate a token as of `now`
    pub async fn validate_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<DecodedToken, ApplicationError> {
        let decoded = self.check_claims(token, now)?;
        self.check_session(&decoded)?;
        self.check_user(&decoded.user_id).await?;

        debug!(
            user_id = %decoded.user_id,
            session_id = %decoded.session_id,
            "Token validated"
        );
        Ok(decoded)
    }

    fn check_claims(&self, token: &str, now: DateTime<Utc>) -> Result<DecodedToken, ApplicationError> {
        let RawTokenClaims {
            user_id,
            session_id,
            issued_at,
            expires_at,
        } = self.codec.decode(token)?;

        let user_id = required_claim(user_id, "userId")?;
        let user_id =
            UserId::new(user_id).map_err(|e| ApplicationError::InvalidToken(e.to_string()))?;

        let session_id = required_claim(session_id, "sessionId")?;
        let session_id = SessionId::new(session_id)
            .map_err(|e| ApplicationError::InvalidToken(e.to_string()))?;

        let exp = expires_at
            .ok_or_else(|| ApplicationError::InvalidToken("missing exp claim".to_string()))?;
        if exp < now.timestamp() {
            debug!(user_id = %user_id, session_id = %session_id, "Token expired");
            return Err(ApplicationError::TokenExpired);
        }
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| ApplicationError::InvalidToken("exp claim out of range".to_string()))?;

        Ok(DecodedToken {
            user_id,
            session_id,
            issued_at: issued_at.and_then(|iat| DateTime::from_timestamp(iat, 0)),
            expires_at,
        })
    }

    fn check_session(&self, decoded: &DecodedToken) -> Result<(), ApplicationError> {
        if !self.store.is_session_active(&decoded.session_id) {
            debug!(session_id = %decoded.session_id, "Token refers to an inactive session");
            return Err(ApplicationError::SessionInvalidated);
        }

        if !self.store.is_token_valid(&decoded.marker()) {
            debug!(session_id = %decoded.session_id, "Token marker has been revoked");
            return Err(ApplicationError::TokenInvalidated);
        }

        Ok(())
    }

    async fn check_user(&self, user_id: &UserId) -> Result<(), ApplicationError> {
        match self.users.find_user_by_id(user_id).await? {
            None => Err(ApplicationError::UserNotFound),
            Some(user) if !user.is_active() => Err(ApplicationError::UserDeactivated),
            Some(_) => Ok(()),
        }
    }
}

fn required_claim(value: Option<String>, name: &str) -> Result<String, ApplicationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApplicationError::InvalidToken(format!("missing {name} claim")))
}
