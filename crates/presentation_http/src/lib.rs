//! Session security HTTP presentation layer
//!
//! Exposes login, token refresh, logout and password change over HTTP and
//! wraps every route in the security middleware pipeline.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod tasks;

pub use error::ApiError;
pub use middleware::{
    AuthenticatedSession, BodyGuardLayer, LoginRateLimitLayer, RateLimitRule, SecurityAuditLayer,
    SecurityHeadersLayer, SessionAuthLayer, ValidatedJson, ValidationError,
};
pub use routes::{create_app, create_router};
pub use state::AppState;
