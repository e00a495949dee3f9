//! Security configuration: token signing, cookies, rate limits, cache rules.

use std::net::IpAddr;

use application::ports::{DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_SECS, RateLimitPolicy};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::default_true;

/// Signing secret used when none is configured
///
/// Only acceptable for local development; the security validator flags it.
pub const DEV_JWT_SECRET: &str = "sessionguard-dev-secret-change-me";

/// Shortest signing secret accepted without a warning (256 bits)
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// One rate limit rule, applied to every path under `path_prefix`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRuleConfig {
    /// Path prefix the rule applies to (e.g. `/auth/login`)
    pub path_prefix: String,

    /// Attempts admitted per window
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Fixed message returned with the 429 response
    #[serde(default = "default_rate_limit_message")]
    pub message: String,
}

impl RateLimitRuleConfig {
    /// The counter policy this rule enforces
    #[must_use]
    pub const fn policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(self.max_attempts, self.window_secs)
    }

    /// Whether a request path falls under this rule
    ///
    /// `/api` matches `/api` and `/api/tasks` but not `/apis`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let prefix = self.path_prefix.trim_end_matches('/');
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_window_secs() -> u64 {
    DEFAULT_WINDOW_SECS
}

fn default_rate_limit_message() -> String {
    "Too many requests. Please try again later.".to_string()
}

fn default_rate_limits() -> Vec<RateLimitRuleConfig> {
    vec![
        RateLimitRuleConfig {
            path_prefix: "/auth/login".to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window_secs: DEFAULT_WINDOW_SECS,
            message: "Too many login attempts. Please try again later.".to_string(),
        },
        RateLimitRuleConfig {
            path_prefix: "/api".to_string(),
            max_attempts: 100,
            window_secs: DEFAULT_WINDOW_SECS,
            message: "Too many requests from this IP. Please try again later.".to_string(),
        },
    ]
}

/// Security configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// HS256 signing secret for bearer tokens
    #[serde(default, skip_serializing)]
    pub jwt_secret: Option<SecretString>,

    /// Lifetime of issued tokens in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Cookie carrying the bearer token
    #[serde(default = "default_jwt_cookie")]
    pub jwt_cookie_name: String,

    /// Session cookie cleared on logout
    #[serde(default = "default_session_cookie")]
    pub session_cookie_name: String,

    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub rate_limit_enabled: bool,

    /// Rate limit rules, matched by path prefix in order
    #[serde(default = "default_rate_limits")]
    pub rate_limits: Vec<RateLimitRuleConfig>,

    /// Interval in seconds between purges of elapsed rate limit counters
    #[serde(default = "default_cleanup_interval")]
    pub rate_limit_cleanup_interval_secs: u64,

    /// Path prefixes whose responses must not be cached
    #[serde(default = "default_no_store_prefixes")]
    pub no_store_prefixes: Vec<String>,

    /// Log request bodies that look like they carry weak or inline passwords
    #[serde(default = "default_true")]
    pub weak_password_check: bool,

    /// Trusted proxy IP addresses for X-Forwarded-For header validation
    ///
    /// Only IPs in this list are trusted to set X-Forwarded-For headers.
    /// If empty, the direct connection IP is always used.
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

const fn default_token_ttl() -> u64 {
    3600
}

fn default_jwt_cookie() -> String {
    "sessionguard-jwt".to_string()
}

fn default_session_cookie() -> String {
    "sessionguard.sessionToken".to_string()
}

const fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

fn default_no_store_prefixes() -> Vec<String> {
    vec!["/auth".to_string(), "/dashboard".to_string()]
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: default_token_ttl(),
            jwt_cookie_name: default_jwt_cookie(),
            session_cookie_name: default_session_cookie(),
            rate_limit_enabled: true,
            rate_limits: default_rate_limits(),
            rate_limit_cleanup_interval_secs: default_cleanup_interval(),
            no_store_prefixes: default_no_store_prefixes(),
            weak_password_check: true,
            trusted_proxies: Vec::new(),
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field(
                "jwt_secret",
                &if self.jwt_secret.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("jwt_cookie_name", &self.jwt_cookie_name)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("rate_limit_enabled", &self.rate_limit_enabled)
            .field("rate_limits", &self.rate_limits)
            .field(
                "rate_limit_cleanup_interval_secs",
                &self.rate_limit_cleanup_interval_secs,
            )
            .field("no_store_prefixes", &self.no_store_prefixes)
            .field("weak_password_check", &self.weak_password_check)
            .field("trusted_proxies", &self.trusted_proxies)
            .finish()
    }
}

impl SecurityConfig {
    /// The configured signing secret, or the development fallback
    #[must_use]
    pub fn jwt_secret_or_dev(&self) -> SecretString {
        self.jwt_secret
            .clone()
            .unwrap_or_else(|| SecretString::from(DEV_JWT_SECRET))
    }

    /// Token lifetime as a chrono duration
    #[must_use]
    pub fn token_ttl(&self) -> chrono::Duration {
        i64::try_from(self.token_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn default_rules_cover_login_and_api() {
        let config = SecurityConfig::default();
        let login = &config.rate_limits[0];

        assert_eq!(login.path_prefix, "/auth/login");
        assert_eq!(login.policy(), RateLimitPolicy::new(5, 900));
        assert_eq!(
            login.message,
            "Too many login attempts. Please try again later."
        );
        assert_eq!(config.rate_limits[1].policy(), RateLimitPolicy::new(100, 900));
    }

    #[test]
    fn missing_secret_falls_back_to_dev_secret() {
        let config = SecurityConfig::default();
        assert_eq!(config.jwt_secret_or_dev().expose_secret(), DEV_JWT_SECRET);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = SecurityConfig {
            jwt_secret: Some(SecretString::from("super-secret-signing-key")),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-signing-key"));
    }

    #[test]
    fn rule_matches_on_segment_boundaries() {
        let rule = &SecurityConfig::default().rate_limits[1];

        assert!(rule.matches("/api"));
        assert!(rule.matches("/api/tasks/1"));
        assert!(!rule.matches("/apis"));
        assert!(!rule.matches("/auth/login"));
    }

    #[test]
    fn partial_rule_uses_defaults() {
        let rule: RateLimitRuleConfig =
            serde_json::from_str(r#"{"path_prefix": "/auth/reset"}"#).unwrap();
        assert_eq!(rule.policy(), RateLimitPolicy::default());
    }
}
