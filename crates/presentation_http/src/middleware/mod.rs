//! HTTP middleware components
//!
//! The security pipeline, outermost first: response headers, audit logging,
//! body guard, rate limiting and (on protected routes) session authentication.

pub mod audit;
pub mod body_guard;
pub mod client_ip;
pub mod rate_limit;
pub mod security_headers;
pub mod session_auth;
pub mod validation;

pub use audit::{SecurityAudit, SecurityAuditLayer};
pub use body_guard::{BodyGuard, BodyGuardLayer};
pub use rate_limit::{LoginRateLimit, LoginRateLimitLayer, RateLimitRule};
pub use security_headers::{SecurityHeaders, SecurityHeadersLayer};
pub use session_auth::{AuthenticatedSession, SessionAuth, SessionAuthLayer};
pub use validation::{ValidatedJson, ValidationError, validate_password_strength};
