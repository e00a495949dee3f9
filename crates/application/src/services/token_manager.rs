//! Token issuance - Login, refresh and password change
//!
//! Every path that hands out a token first creates a fresh session, so a
//! token is always bound to exactly one session and dies with it.

use std::sync::Arc;

use domain::{EmailAddress, UserId};
use tracing::{error, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{IssuedToken, PasswordHasherPort, TokenCodecPort, UserDirectoryPort},
    services::{SessionManager, TokenValidator},
};

/// Issues and rotates bearer tokens
pub struct TokenManager {
    validator: Arc<TokenValidator>,
    sessions: Arc<SessionManager>,
    codec: Arc<dyn TokenCodecPort>,
    users: Arc<dyn UserDirectoryPort>,
    hasher: Arc<dyn PasswordHasherPort>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager").finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Create a new token manager
    pub fn new(
        validator: Arc<TokenValidator>,
        sessions: Arc<SessionManager>,
        codec: Arc<dyn TokenCodecPort>,
        users: Arc<dyn UserDirectoryPort>,
        hasher: Arc<dyn PasswordHasherPort>,
    ) -> Self {
        Self {
            validator,
            sessions,
            codec,
            users,
            hasher,
        }
    }

    /// Swap a valid token for a new one bound to a new session
    ///
    /// The old session is invalidated before the new one is created. A token
    /// that fails validation leaves every session untouched. When the same
    /// token is refreshed concurrently only the caller that revokes the old
    /// session gets a new one; the others fail with
    /// [`ApplicationError::SessionInvalidated`].
    #[instrument(skip_all)]
    pub async fn refresh_token(&self, current_token: &str) -> Result<IssuedToken, ApplicationError> {
        let decoded = self.validator.validate_token(current_token).await?;

        if !self
            .sessions
            .revoke_user_session(&decoded.user_id, &decoded.session_id)?
        {
            warn!(
                user_id = %decoded.user_id,
                session_id = %decoded.session_id,
                "Refresh lost the race for an already rotated session"
            );
            return Err(ApplicationError::SessionInvalidated);
        }
        let issued = self.issue_session(&decoded.user_id)?;

        info!(
            user_id = %decoded.user_id,
            old_session_id = %decoded.session_id,
            new_session_id = %issued.session_id,
            "Token refreshed"
        );
        Ok(issued)
    }

    /// Check credentials and start a session
    ///
    /// Unknown emails, wrong passwords and soft-deleted accounts all fail
    /// with the same [`ApplicationError::InvalidCredentials`].
    #[instrument(skip(self, password), fields(email_domain = %email.domain()))]
    pub async fn issue_for_login(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<IssuedToken, ApplicationError> {
        let Some(user) = self.users.find_user_by_email(email).await? else {
            warn!("Login attempt for unknown email");
            return Err(ApplicationError::InvalidCredentials);
        };

        let password_ok = self.hasher.verify(password, &user.password_hash)?;
        if !password_ok || !user.is_active() {
            warn!(user_id = %user.id, deleted = user.is_deleted, "Login rejected");
            return Err(ApplicationError::InvalidCredentials);
        }

        let issued = self.issue_session(&user.id)?;
        info!(user_id = %user.id, session_id = %issued.session_id, "User logged in");
        Ok(issued)
    }

    /// Change a user's password and rotate all of their sessions
    ///
    /// After the new hash is stored every session of the user is destroyed
    /// and a single new session and token are issued. A failure while
    /// rotating surfaces as [`ApplicationError::Internal`].
    #[instrument(skip(self, current_password, new_password), fields(user_id = %user_id))]
    pub async fn handle_password_change(
        &self,
        user_id: &UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<IssuedToken, ApplicationError> {
        let user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .ok_or(ApplicationError::UserNotFound)?;
        if !user.is_active() {
            return Err(ApplicationError::UserDeactivated);
        }

        if !self.hasher.verify(current_password, &user.password_hash)? {
            warn!("Password change rejected: current password mismatch");
            return Err(ApplicationError::InvalidCredentials);
        }

        let new_hash = self.hasher.hash(new_password)?;
        self.users.update_password_hash(user_id, &new_hash).await?;

        let revoked = self.sessions.invalidate_all_user_sessions(user_id);
        let issued = self.issue_session(user_id).map_err(|e| {
            error!(error = %e, "Failed to issue session after password change");
            ApplicationError::Internal("Failed to update session".to_string())
        })?;

        info!(
            revoked_sessions = revoked,
            session_id = %issued.session_id,
            "Password changed, sessions rotated"
        );
        Ok(issued)
    }

    /// End every session of a user, returning how many were active
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub fn logout(&self, user_id: &UserId) -> usize {
        self.sessions.invalidate_all_user_sessions(user_id)
    }

    fn issue_session(&self, user_id: &UserId) -> Result<IssuedToken, ApplicationError> {
        let session_id = self.sessions.create_new_session(user_id);

        match self.codec.mint(user_id, &session_id) {
            Ok(issued) => Ok(issued),
            Err(e) => {
                self.sessions.invalidate_user_session(user_id, &session_id)?;
                Err(e)
            },
        }
    }
}
