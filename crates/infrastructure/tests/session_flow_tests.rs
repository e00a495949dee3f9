//! End-to-end session flows over the real adapters

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{PasswordHasherPort, SessionStorePort, TokenCodecPort, UserDirectoryPort},
    services::{SessionManager, TokenManager, TokenValidator},
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use domain::{EmailAddress, Session, SessionId, UserAccount, UserId};
use infrastructure::{
    Argon2PasswordHasher, InMemorySessionStore, InMemoryUserDirectory, JwtTokenCodec,
};
use secrecy::SecretString;
use tokio::sync::Barrier;

const SECRET: &str = "integration-test-secret-with-32-bytes!";
const PASSWORD: &str = "Old-Passw0rd!";

struct Harness {
    store: Arc<InMemorySessionStore>,
    users: Arc<InMemoryUserDirectory>,
    codec: Arc<JwtTokenCodec>,
    validator: Arc<TokenValidator>,
    sessions: Arc<SessionManager>,
    tokens: TokenManager,
}

fn harness_with_ttl(ttl: Duration) -> Harness {
    let hasher = Arc::new(Argon2PasswordHasher::new());
    let hash = hasher.hash(PASSWORD).unwrap();
    let users = Arc::new(InMemoryUserDirectory::with_users([UserAccount::new(
        UserId::new("u1").unwrap(),
        EmailAddress::new("u1@example.com").unwrap(),
        hash,
    )]));
    let store = Arc::new(InMemorySessionStore::new());
    let codec = Arc::new(JwtTokenCodec::new(&SecretString::from(SECRET), ttl));

    let validator = Arc::new(TokenValidator::new(
        codec.clone(),
        store.clone(),
        users.clone(),
    ));
    let sessions = Arc::new(SessionManager::new(store.clone()));
    let tokens = TokenManager::new(
        validator.clone(),
        sessions.clone(),
        codec.clone(),
        users.clone(),
        hasher,
    );

    Harness {
        store,
        users,
        codec,
        validator,
        sessions,
        tokens,
    }
}

fn harness() -> Harness {
    harness_with_ttl(Duration::hours(1))
}

fn u1() -> UserId {
    UserId::new("u1").unwrap()
}

#[tokio::test]
async fn login_token_validates_until_logout() {
    let h = harness();
    let email = EmailAddress::new("u1@example.com").unwrap();

    let issued = h.tokens.issue_for_login(&email, PASSWORD).await.unwrap();
    let decoded = h.validator.validate_token(&issued.token).await.unwrap();
    assert_eq!(decoded.user_id, u1());
    assert_eq!(decoded.session_id, issued.session_id);

    assert_eq!(h.tokens.logout(&u1()), 1);
    let err = h.validator.validate_token(&issued.token).await.unwrap_err();
    assert!(matches!(err, ApplicationError::SessionInvalidated));
}

#[tokio::test]
async fn password_change_invalidates_existing_session_tokens() {
    let h = harness();
    let s1 = SessionId::new("s1").unwrap();
    h.store
        .register(Session::with_id(s1.clone(), u1(), Utc::now()));
    let old = h.codec.mint(&u1(), &s1).unwrap();
    assert!(h.validator.validate_token(&old.token).await.is_ok());

    let rotated = h
        .tokens
        .handle_password_change(&u1(), PASSWORD, "N3w-Passw0rd!")
        .await
        .unwrap();

    let err = h.validator.validate_token(&old.token).await.unwrap_err();
    assert!(matches!(err, ApplicationError::SessionInvalidated));
    assert!(h.validator.validate_token(&rotated.token).await.is_ok());
    assert_eq!(h.sessions.active_sessions(&u1()).len(), 1);

    let email = EmailAddress::new("u1@example.com").unwrap();
    assert!(matches!(
        h.tokens.issue_for_login(&email, PASSWORD).await,
        Err(ApplicationError::InvalidCredentials)
    ));
    assert!(h.tokens.issue_for_login(&email, "N3w-Passw0rd!").await.is_ok());
}

#[tokio::test]
async fn refresh_rotates_the_session() {
    let h = harness();
    let first = h
        .tokens
        .issue_for_login(&EmailAddress::new("u1@example.com").unwrap(), PASSWORD)
        .await
        .unwrap();

    let second = h.tokens.refresh_token(&first.token).await.unwrap();

    assert_ne!(first.session_id, second.session_id);
    assert!(!h.sessions.is_session_active(&first.session_id));
    assert!(h.sessions.is_session_active(&second.session_id));
    assert!(matches!(
        h.tokens.refresh_token(&first.token).await,
        Err(ApplicationError::SessionInvalidated)
    ));
}

#[tokio::test]
async fn refresh_with_expired_token_creates_no_session() {
    let h = harness_with_ttl(Duration::seconds(-60));
    let session_id = h.sessions.create_new_session(&u1());
    let expired = h.codec.mint(&u1(), &session_id).unwrap();
    let before = h.store.active_session_count();

    let err = h.tokens.refresh_token(&expired.token).await.unwrap_err();

    assert!(matches!(err, ApplicationError::TokenExpired));
    assert_eq!(h.store.active_session_count(), before);
    assert!(h.sessions.is_session_active(&session_id));
}

#[tokio::test]
async fn deactivated_user_token_is_rejected() {
    let h = harness();
    let issued = h
        .tokens
        .issue_for_login(&EmailAddress::new("u1@example.com").unwrap(), PASSWORD)
        .await
        .unwrap();

    assert!(h.users.deactivate(&u1()));

    let err = h.validator.validate_token(&issued.token).await.unwrap_err();
    assert!(matches!(err, ApplicationError::UserDeactivated));
}

#[tokio::test]
async fn token_signed_with_other_secret_is_invalid() {
    let h = harness();
    let session_id = h.sessions.create_new_session(&u1());
    let foreign = JwtTokenCodec::new(
        &SecretString::from("a-completely-different-secret-value"),
        Duration::hours(1),
    );
    let forged = foreign.mint(&u1(), &session_id).unwrap();

    let err = h.validator.validate_token(&forged.token).await.unwrap_err();
    assert!(matches!(err, ApplicationError::InvalidToken(_)));
}

#[tokio::test]
async fn double_invalidation_is_a_no_op() {
    let h = harness();
    let session_id = h.sessions.create_new_session(&u1());

    h.sessions
        .invalidate_user_session(&u1(), &session_id)
        .unwrap();
    let after_first = (h.store.active_session_count(), h.store.token_count());
    h.sessions
        .invalidate_user_session(&u1(), &session_id)
        .unwrap();

    assert_eq!(
        (h.store.active_session_count(), h.store.token_count()),
        after_first
    );
}

/// Directory whose id lookups wait until two callers are inside validation
struct LockstepDirectory {
    inner: Arc<InMemoryUserDirectory>,
    barrier: Barrier,
}

#[async_trait]
impl UserDirectoryPort for LockstepDirectory {
    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, ApplicationError> {
        self.barrier.wait().await;
        self.inner.find_user_by_id(id).await
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, ApplicationError> {
        self.inner.find_user_by_email(email).await
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), ApplicationError> {
        self.inner.update_password_hash(id, password_hash).await
    }
}

#[tokio::test]
async fn concurrent_refreshes_of_one_token_rotate_once() {
    let h = harness();
    let email = EmailAddress::new("u1@example.com").unwrap();
    let old = h.tokens.issue_for_login(&email, PASSWORD).await.unwrap();

    let users: Arc<dyn UserDirectoryPort> = Arc::new(LockstepDirectory {
        inner: h.users.clone(),
        barrier: Barrier::new(2),
    });
    let validator = Arc::new(TokenValidator::new(
        h.codec.clone(),
        h.store.clone(),
        Arc::clone(&users),
    ));
    let tokens = TokenManager::new(
        validator,
        h.sessions.clone(),
        h.codec.clone(),
        users,
        Arc::new(Argon2PasswordHasher::new()),
    );

    let (first, second) = tokio::join!(
        tokens.refresh_token(&old.token),
        tokens.refresh_token(&old.token)
    );

    let (won, lost) = match (first, second) {
        (Ok(issued), Err(e)) | (Err(e), Ok(issued)) => (issued, e),
        (first, second) => panic!("expected one winner, got {first:?} and {second:?}"),
    };
    assert!(matches!(lost, ApplicationError::SessionInvalidated));
    assert_eq!(h.sessions.active_sessions(&u1()).len(), 1);
    assert!(h.validator.validate_token(&won.token).await.is_ok());
}
