//! Session lifecycle - Creation and invalidation of login sessions

use std::sync::Arc;

use domain::{Session, SessionId, TokenMarker, UserId};
use tracing::{debug, info, instrument};

use crate::{error::ApplicationError, ports::SessionStorePort};

/// Creates and destroys sessions in the session store
pub struct SessionManager {
    store: Arc<dyn SessionStorePort>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(store: Arc<dyn SessionStorePort>) -> Self {
        Self { store }
    }

    /// Start a session for a user and mark its token as valid
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub fn create_new_session(&self, user_id: &UserId) -> SessionId {
        let session = Session::start(user_id.clone());
        let session_id = session.id.clone();
        self.store.register(session);

        info!(session_id = %session_id, "Session created");
        session_id
    }

    /// Invalidate one session of a user together with its token marker
    ///
    /// Invalidating a session that is already gone is not an error. A
    /// session owned by another user is left untouched and reported as
    /// [`ApplicationError::NotAuthorized`].
    #[instrument(skip(self), fields(user_id = %user_id, session_id = %session_id))]
    pub fn invalidate_user_session(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
    ) -> Result<(), ApplicationError> {
        self.revoke_user_session(user_id, session_id).map(|_| ())
    }

    /// Invalidate one session of a user, reporting whether it was active
    ///
    /// The store removes session and marker under one lock, so among
    /// concurrent callers exactly one sees `true`.
    pub fn revoke_user_session(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
    ) -> Result<bool, ApplicationError> {
        let marker = TokenMarker::new(user_id.clone(), session_id.clone());
        let revoked = self.store.revoke(&marker)?;
        if revoked {
            info!(user_id = %user_id, session_id = %session_id, "Session invalidated");
        } else {
            debug!(user_id = %user_id, session_id = %session_id, "Session already inactive");
        }
        Ok(revoked)
    }

    /// Invalidate every session of a user, returning how many were removed
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub fn invalidate_all_user_sessions(&self, user_id: &UserId) -> usize {
        let removed = self.store.revoke_all_for_user(user_id);
        info!(count = removed.len(), "Invalidated all sessions for user");
        removed.len()
    }

    /// Active sessions of a user, oldest first
    pub fn active_sessions(&self, user_id: &UserId) -> Vec<Session> {
        self.store.sessions_for_user(user_id)
    }

    /// Whether a session is currently active
    pub fn is_session_active(&self, session_id: &SessionId) -> bool {
        self.store.is_session_active(session_id)
    }
}
