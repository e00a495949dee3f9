//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod login_rate_limiter;
mod password_hasher;
mod session_store;
mod token_codec;
mod user_directory;

pub use login_rate_limiter::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_SECS, LoginRateLimiterPort, RateLimitPolicy,
};
#[cfg(test)]
pub use login_rate_limiter::MockLoginRateLimiterPort;
pub use password_hasher::PasswordHasherPort;
#[cfg(test)]
pub use password_hasher::MockPasswordHasherPort;
pub use session_store::SessionStorePort;
#[cfg(test)]
pub use session_store::MockSessionStorePort;
pub use token_codec::{IssuedToken, RawTokenClaims, TokenCodecPort};
#[cfg(test)]
pub use token_codec::MockTokenCodecPort;
pub use user_directory::UserDirectoryPort;
#[cfg(test)]
pub use user_directory::MockUserDirectoryPort;
