//! Session store port
//!
//! Server-side registry of active sessions and the token markers bound to
//! them. Every operation is idempotent and every composite operation is
//! atomic with respect to concurrent callers.

use domain::{Session, SessionId, TokenMarker, UserId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the session and token marker registry
#[cfg_attr(test, automock)]
pub trait SessionStorePort: Send + Sync {
    /// Whether a token marker is currently present
    fn is_token_valid(&self, marker: &TokenMarker) -> bool;

    /// Remove a token marker; missing markers are a no-op
    fn invalidate_token(&self, marker: &TokenMarker);

    /// Whether a session is currently active
    fn is_session_active(&self, session_id: &SessionId) -> bool;

    /// Remove a session together with its marker and user index entry
    fn invalidate_session(&self, session_id: &SessionId);

    /// Add a token marker for an active session
    ///
    /// Fails with [`ApplicationError::SessionInvalidated`] when the session
    /// is not active for the marker's user.
    fn add_token(&self, marker: &TokenMarker) -> Result<(), ApplicationError>;

    /// Register a session without a marker
    fn add_session(&self, session: Session);

    /// Register a session and its marker in one step
    fn register(&self, session: Session);

    /// Remove a session and its marker in one step
    ///
    /// Returns `false` when the session was already gone. Fails with
    /// [`ApplicationError::NotAuthorized`] when the session belongs to a
    /// different user, leaving everything untouched.
    fn revoke(&self, marker: &TokenMarker) -> Result<bool, ApplicationError>;

    /// Remove every session and marker of a user, returning the removed IDs
    fn revoke_all_for_user(&self, user_id: &UserId) -> Vec<SessionId>;

    /// Active sessions of a user, oldest first
    fn sessions_for_user(&self, user_id: &UserId) -> Vec<Session>;

    /// Total number of active sessions
    fn active_session_count(&self) -> usize;
}
