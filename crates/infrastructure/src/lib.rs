//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: token signing,
//! in-memory session and rate limit state, password hashing and the seeded
//! user directory. Also owns configuration loading, logging setup and
//! start-up security validation.

pub mod adapters;
pub mod config;
pub mod telemetry;
pub mod validation;

pub use adapters::*;
pub use config::{
    AppConfig, Environment, RateLimitRuleConfig, SecurityConfig, SeedUserConfig, ServerConfig,
    TelemetryAppConfig,
};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
pub use validation::{SecurityValidator, SecurityWarning, WarningSeverity};
