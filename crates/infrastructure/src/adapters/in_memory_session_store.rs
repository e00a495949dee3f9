//! In-memory session store adapter
//!
//! Keeps sessions, token markers and the per-user index in one table behind
//! a single `parking_lot` lock. Every mutating operation takes the write
//! lock once, so a reader never sees a marker without its session.
//!
//! The store lives in process memory only: it is lost on restart and is not
//! shared between instances. Sessions leave the table only through explicit
//! invalidation.

use std::collections::{HashMap, HashSet};

use application::{error::ApplicationError, ports::SessionStorePort};
use domain::{Session, SessionId, TokenMarker, UserId};
use parking_lot::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct SessionTable {
    sessions: HashMap<SessionId, Session>,
    markers: HashSet<TokenMarker>,
    by_user: HashMap<UserId, HashSet<SessionId>>,
}

impl SessionTable {
    fn insert_session(&mut self, session: Session) {
        // re-registering an ID must not leave the previous owner's entries behind
        self.remove_session(&session.id);
        self.by_user
            .entry(session.user_id.clone())
            .or_default()
            .insert(session.id.clone());
        self.sessions.insert(session.id.clone(), session);
    }

    fn remove_session(&mut self, session_id: &SessionId) -> Option<Session> {
        let session = self.sessions.remove(session_id)?;
        self.markers.remove(&session.marker());

        if let Some(ids) = self.by_user.get_mut(&session.user_id) {
            ids.remove(session_id);
            if ids.is_empty() {
                self.by_user.remove(&session.user_id);
            }
        }
        Some(session)
    }
}

/// Process-local implementation of [`SessionStorePort`]
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    table: RwLock<SessionTable>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of token markers currently held
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.table.read().markers.len()
    }
}

impl SessionStorePort for InMemorySessionStore {
    fn is_token_valid(&self, marker: &TokenMarker) -> bool {
        self.table.read().markers.contains(marker)
    }

    fn invalidate_token(&self, marker: &TokenMarker) {
        if !self.table.write().markers.remove(marker) {
            debug!(marker = %marker, "Token marker already absent");
        }
    }

    fn is_session_active(&self, session_id: &SessionId) -> bool {
        self.table.read().sessions.contains_key(session_id)
    }

    fn invalidate_session(&self, session_id: &SessionId) {
        if self.table.write().remove_session(session_id).is_none() {
            debug!(session_id = %session_id, "Session already inactive");
        }
    }

    fn add_token(&self, marker: &TokenMarker) -> Result<(), ApplicationError> {
        let mut table = self.table.write();
        let owned_by_user = table
            .sessions
            .get(marker.session_id())
            .is_some_and(|s| s.is_owned_by(marker.user_id()));

        if !owned_by_user {
            warn!(marker = %marker, "Refusing token marker for inactive session");
            return Err(ApplicationError::SessionInvalidated);
        }

        table.markers.insert(marker.clone());
        Ok(())
    }

    fn add_session(&self, session: Session) {
        self.table.write().insert_session(session);
    }

    fn register(&self, session: Session) {
        let marker = session.marker();
        let mut table = self.table.write();
        table.insert_session(session);
        table.markers.insert(marker);
    }

    fn revoke(&self, marker: &TokenMarker) -> Result<bool, ApplicationError> {
        let mut table = self.table.write();
        let owner = table
            .sessions
            .get(marker.session_id())
            .map(|s| s.user_id.clone());

        match owner {
            None => {
                table.markers.remove(marker);
                Ok(false)
            },
            Some(owner) if &owner != marker.user_id() => {
                warn!(
                    session_id = %marker.session_id(),
                    requested_by = %marker.user_id(),
                    "Session revocation by non-owner rejected"
                );
                Err(ApplicationError::NotAuthorized(
                    "Session belongs to another user".to_string(),
                ))
            },
            Some(_) => Ok(table.remove_session(marker.session_id()).is_some()),
        }
    }

    fn revoke_all_for_user(&self, user_id: &UserId) -> Vec<SessionId> {
        let mut table = self.table.write();
        let Some(ids) = table.by_user.remove(user_id) else {
            return Vec::new();
        };

        for id in &ids {
            table.sessions.remove(id);
            table
                .markers
                .remove(&TokenMarker::new(user_id.clone(), id.clone()));
        }
        ids.into_iter().collect()
    }

    fn sessions_for_user(&self, user_id: &UserId) -> Vec<Session> {
        let table = self.table.read();
        let mut sessions: Vec<Session> = table
            .by_user
            .get(user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| table.sessions.get(id).cloned())
            .collect();
        drop(table);

        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        sessions
    }

    fn active_session_count(&self) -> usize {
        self.table.read().sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn session(user_id: &str, session_id: &str) -> Session {
        Session::with_id(SessionId::new(session_id).unwrap(), user(user_id), Utc::now())
    }

    #[test]
    fn register_makes_session_and_marker_valid() {
        let store = InMemorySessionStore::new();
        let s = session("u1", "s1");
        store.register(s.clone());

        assert!(store.is_session_active(&s.id));
        assert!(store.is_token_valid(&s.marker()));
        assert_eq!(store.active_session_count(), 1);
    }

    #[test]
    fn add_token_requires_active_session_of_same_user() {
        let store = InMemorySessionStore::new();
        let s = session("u1", "s1");

        let err = store.add_token(&s.marker()).unwrap_err();
        assert!(matches!(err, ApplicationError::SessionInvalidated));

        store.add_session(s.clone());
        let foreign = TokenMarker::new(user("u2"), s.id.clone());
        assert!(store.add_token(&foreign).is_err());

        store.add_token(&s.marker()).unwrap();
        assert!(store.is_token_valid(&s.marker()));
    }

    #[test]
    fn markers_have_set_semantics() {
        let store = InMemorySessionStore::new();
        let s = session("u1", "s1");
        store.register(s.clone());
        store.add_token(&s.marker()).unwrap();

        assert_eq!(store.token_count(), 1);
    }

    #[test]
    fn invalidate_session_drops_its_marker() {
        let store = InMemorySessionStore::new();
        let s = session("u1", "s1");
        store.register(s.clone());

        store.invalidate_session(&s.id);

        assert!(!store.is_session_active(&s.id));
        assert!(!store.is_token_valid(&s.marker()));
        assert!(store.sessions_for_user(&user("u1")).is_empty());
    }

    #[test]
    fn invalidate_token_keeps_session() {
        let store = InMemorySessionStore::new();
        let s = session("u1", "s1");
        store.register(s.clone());

        store.invalidate_token(&s.marker());
        store.invalidate_token(&s.marker());

        assert!(store.is_session_active(&s.id));
        assert!(!store.is_token_valid(&s.marker()));
    }

    #[test]
    fn revoke_is_idempotent() {
        let store = InMemorySessionStore::new();
        let s = session("u1", "s1");
        store.register(s.clone());

        assert!(store.revoke(&s.marker()).unwrap());
        assert!(!store.revoke(&s.marker()).unwrap());
        assert_eq!(store.active_session_count(), 0);
        assert_eq!(store.token_count(), 0);
    }

    #[test]
    fn revoke_by_other_user_changes_nothing() {
        let store = InMemorySessionStore::new();
        let s = session("u1", "s1");
        store.register(s.clone());

        let foreign = TokenMarker::new(user("u2"), s.id.clone());
        let err = store.revoke(&foreign).unwrap_err();

        assert!(matches!(err, ApplicationError::NotAuthorized(_)));
        assert!(store.is_session_active(&s.id));
        assert!(store.is_token_valid(&s.marker()));
    }

    #[test]
    fn revoke_all_only_touches_that_user() {
        let store = InMemorySessionStore::new();
        store.register(session("u1", "s1"));
        store.register(session("u1", "s2"));
        store.register(session("u2", "s3"));

        let mut removed = store.revoke_all_for_user(&user("u1"));
        removed.sort();

        assert_eq!(
            removed,
            vec![SessionId::new("s1").unwrap(), SessionId::new("s2").unwrap()]
        );
        assert_eq!(store.active_session_count(), 1);
        assert_eq!(store.token_count(), 1);
        assert!(store.revoke_all_for_user(&user("u1")).is_empty());
    }

    #[test]
    fn re_registering_an_id_moves_it_to_the_new_owner() {
        let store = InMemorySessionStore::new();
        store.register(session("u1", "s1"));
        store.register(session("u2", "s1"));

        assert!(store.sessions_for_user(&user("u1")).is_empty());
        assert_eq!(store.sessions_for_user(&user("u2")).len(), 1);
        assert_eq!(store.token_count(), 1);
    }

    #[test]
    fn sessions_for_user_are_oldest_first() {
        let store = InMemorySessionStore::new();
        let first = Session::start(user("u1"));
        let mut second = Session::start(user("u1"));
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        store.register(second.clone());
        store.register(first.clone());

        let listed = store.sessions_for_user(&user("u1"));
        assert_eq!(listed, vec![first, second]);
    }

    #[test]
    fn concurrent_register_and_revoke_keep_markers_consistent() {
        let store = Arc::new(InMemorySessionStore::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let s = session("u1", &format!("s{t}-{i}"));
                        store.register(s.clone());
                        if i % 2 == 0 {
                            store.revoke(&s.marker()).unwrap();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.active_session_count(), 400);
        assert_eq!(store.token_count(), 400);
        for s in store.sessions_for_user(&user("u1")) {
            assert!(store.is_token_valid(&s.marker()));
        }
    }
}
