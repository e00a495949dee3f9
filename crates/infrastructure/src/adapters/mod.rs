//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod argon2_password_hasher;
mod in_memory_login_rate_limiter;
mod in_memory_session_store;
mod in_memory_user_directory;
mod jwt_token_codec;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_login_rate_limiter::InMemoryLoginRateLimiter;
pub use in_memory_session_store::InMemorySessionStore;
pub use in_memory_user_directory::InMemoryUserDirectory;
pub use jwt_token_codec::{DEFAULT_TOKEN_TTL_SECS, JwtTokenCodec};
