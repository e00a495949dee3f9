//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `security`: token signing, cookies, rate limits, cache rules
//! - `telemetry`: log filtering
//! - `users`: seed accounts for the in-memory user directory
//!
//! Sources are layered: built-in defaults, then an optional `config.toml`,
//! then `SESSIONGUARD_*` environment variables with `__` between nested keys
//! (e.g. `SESSIONGUARD_SERVER__PORT=8080`).

mod security;
mod server;
mod telemetry;
mod users;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use security::{DEV_JWT_SECRET, MIN_JWT_SECRET_LEN, RateLimitRuleConfig, SecurityConfig};
pub use server::{DEFAULT_MAX_BODY_BYTES, ServerConfig};
pub use telemetry::TelemetryAppConfig;
pub use users::SeedUserConfig;

/// Prefix of environment variables read by [`AppConfig::load`]
pub const ENV_PREFIX: &str = "SESSIONGUARD";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
///
/// Controls security validation strictness and how much error detail
/// reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - relaxed security warnings
    #[default]
    Development,
    /// Production environment - strict security validation
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    ///
    /// In production, critical security warnings prevent startup unless
    /// SESSIONGUARD_ALLOW_INSECURE_CONFIG=true.
    #[serde(default)]
    pub environment: Option<Environment>,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Security configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: TelemetryAppConfig,

    /// Accounts loaded into the in-memory user directory
    #[serde(default)]
    pub users: Vec<SeedUserConfig>,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    ///
    /// Any malformed value is an error; callers must not fall back to
    /// defaults, which would start the service in development mode.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with_env(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(env: config::Environment) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., SESSIONGUARD_SERVER__PORT)
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// The effective environment (development unless stated otherwise)
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment.unwrap_or_default()
    }

    /// Whether the application runs in production mode
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment() == Environment::Production
    }
}
