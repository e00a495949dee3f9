//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Token could not be decoded, failed verification or lacks required claims
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token `exp` claim lies in the past
    #[error("Token has expired")]
    TokenExpired,

    /// The session named by the token is no longer active
    #[error("Session has been invalidated")]
    SessionInvalidated,

    /// The session is active but the token marker was revoked
    #[error("Token has been invalidated")]
    TokenInvalidated,

    /// The token refers to a user the directory does not know
    #[error("User not found")]
    UserNotFound,

    /// The token refers to a soft-deleted user
    #[error("User account is deactivated")]
    UserDeactivated,

    /// Login with unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Request body exceeds the configured cap
    #[error("Payload too large: limit is {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// User not authorized
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether this error means the caller is not (or no longer) authenticated
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken(_)
                | Self::TokenExpired
                | Self::SessionInvalidated
                | Self::TokenInvalidated
                | Self::UserNotFound
                | Self::UserDeactivated
                | Self::InvalidCredentials
        )
    }

    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
