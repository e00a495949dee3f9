//! Application state shared across handlers

use std::sync::Arc;

use application::{
    ports::{SessionStorePort, UserDirectoryPort},
    services::{SessionManager, TokenManager, TokenValidator},
};
use domain::DomainError;
use infrastructure::{
    AppConfig, Argon2PasswordHasher, InMemorySessionStore, InMemoryUserDirectory, JwtTokenCodec,
};
use tracing::info;

use crate::middleware::RateLimitRule;

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    /// Bearer token validation
    pub validator: Arc<TokenValidator>,
    /// Session lifecycle
    pub sessions: Arc<SessionManager>,
    /// Login, refresh, password change and logout
    pub tokens: Arc<TokenManager>,
    /// Rate limit rules with their counters
    pub rate_limits: Arc<[RateLimitRule]>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the in-memory adapters and services from configuration
    ///
    /// Fails when a seed user has an invalid id or email.
    pub fn from_config(config: AppConfig) -> Result<Self, DomainError> {
        let accounts = config
            .users
            .iter()
            .map(|seed| seed.to_account())
            .collect::<Result<Vec<_>, _>>()?;
        let users = Arc::new(InMemoryUserDirectory::with_users(accounts));
        info!(seeded_users = users.len(), "User directory ready");

        let store: Arc<dyn SessionStorePort> = Arc::new(InMemorySessionStore::new());
        Ok(Self::with_adapters(config, store, users))
    }

    /// Wire the services over caller-supplied store and directory
    pub fn with_adapters(
        config: AppConfig,
        store: Arc<dyn SessionStorePort>,
        users: Arc<dyn UserDirectoryPort>,
    ) -> Self {
        let codec = Arc::new(JwtTokenCodec::new(
            &config.security.jwt_secret_or_dev(),
            config.security.token_ttl(),
        ));
        let hasher = Arc::new(Argon2PasswordHasher::new());

        let validator = Arc::new(TokenValidator::new(
            codec.clone(),
            Arc::clone(&store),
            Arc::clone(&users),
        ));
        let sessions = Arc::new(SessionManager::new(store));
        let tokens = Arc::new(TokenManager::new(
            Arc::clone(&validator),
            Arc::clone(&sessions),
            codec,
            users,
            hasher,
        ));

        let rate_limits = config
            .security
            .rate_limits
            .iter()
            .cloned()
            .map(RateLimitRule::in_memory)
            .collect();

        Self {
            validator,
            sessions,
            tokens,
            rate_limits,
            config: Arc::new(config),
        }
    }

    /// Whether cookies must carry the `Secure` attribute
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.config.is_production()
    }
}

#[cfg(test)]
mod tests {
    use infrastructure::SeedUserConfig;

    use super::*;

    #[test]
    fn builds_one_limiter_per_rule() {
        let state = AppState::from_config(AppConfig::default()).unwrap();

        assert_eq!(state.rate_limits.len(), 2);
        assert_eq!(state.rate_limits[0].path_prefix(), "/auth/login");
        assert!(!state.secure_cookies());
    }

    #[test]
    fn invalid_seed_user_is_rejected() {
        let config = AppConfig {
            users: vec![SeedUserConfig {
                id: "u1".to_string(),
                email: "not-an-email".to_string(),
                password_hash: "$argon2id$x".to_string(),
            }],
            ..Default::default()
        };

        assert!(AppState::from_config(config).is_err());
    }
}
