//! Security validation for application configuration
//!
//! Validates configuration for security issues and provides warnings at startup.
//! Critical issues in production will prevent startup unless explicitly allowed.

use std::fmt;

use secrecy::ExposeSecret;

use crate::{
    adapters::Argon2PasswordHasher,
    config::{AppConfig, DEV_JWT_SECRET, MIN_JWT_SECRET_LEN},
};

/// Environment variable that lets production start despite critical findings
pub const ALLOW_INSECURE_ENV: &str = "SESSIONGUARD_ALLOW_INSECURE_CONFIG";

const LOGIN_PATH: &str = "/auth/login";

/// Token lifetimes above this are reported
const MAX_RECOMMENDED_TTL_SECS: u64 = 24 * 60 * 60;

/// Severity level for security warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningSeverity {
    /// Informational - no action required
    Info,
    /// Warning - should be addressed but not critical
    Warning,
    /// Critical - must be addressed in production
    Critical,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A security warning with severity and description
#[derive(Debug, Clone)]
pub struct SecurityWarning {
    /// Severity level of the warning
    pub severity: WarningSeverity,
    /// Short code identifying the warning type
    pub code: String,
    /// Human-readable description of the issue
    pub message: String,
    /// Recommended action to resolve the issue
    pub recommendation: String,
}

impl SecurityWarning {
    /// Create a new security warning
    #[must_use]
    pub fn new(
        severity: WarningSeverity,
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            recommendation: recommendation.into(),
        }
    }

    /// Create a critical warning
    #[must_use]
    pub fn critical(
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::new(WarningSeverity::Critical, code, message, recommendation)
    }

    /// Create a warning-level issue
    #[must_use]
    pub fn warning(
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::new(WarningSeverity::Warning, code, message, recommendation)
    }

    /// Create an informational notice
    #[must_use]
    pub fn info(
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::new(WarningSeverity::Info, code, message, recommendation)
    }

    /// Check if this warning is critical
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(self.severity, WarningSeverity::Critical)
    }
}

impl fmt::Display for SecurityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} - {}",
            self.severity, self.code, self.message, self.recommendation
        )
    }
}

/// Validates application configuration for security issues
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityValidator;

impl SecurityValidator {
    /// Validate configuration and return all security warnings
    ///
    /// Returns a list of warnings sorted by severity (critical first).
    #[must_use]
    pub fn validate(config: &AppConfig) -> Vec<SecurityWarning> {
        let mut warnings = Vec::new();
        let is_production = config.is_production();

        Self::check_jwt_secret(config, is_production, &mut warnings);
        Self::check_token_lifetime(config, &mut warnings);
        Self::check_cors_configuration(config, is_production, &mut warnings);
        Self::check_rate_limiting(config, is_production, &mut warnings);
        Self::check_seed_users(config, is_production, &mut warnings);

        // Sort by severity (critical first)
        warnings.sort_by(|a, b| b.severity.cmp(&a.severity));

        warnings
    }

    /// Check if startup should be blocked due to critical security issues
    ///
    /// Returns `true` if the server should refuse to start.
    #[must_use]
    pub fn should_block_startup(config: &AppConfig, warnings: &[SecurityWarning]) -> bool {
        let allow_insecure = std::env::var(ALLOW_INSECURE_ENV)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self::blocks_startup(config, warnings, allow_insecure)
    }

    fn blocks_startup(config: &AppConfig, warnings: &[SecurityWarning], allow_insecure: bool) -> bool {
        let has_critical = warnings.iter().any(SecurityWarning::is_critical);
        config.is_production() && has_critical && !allow_insecure
    }

    /// Log all warnings using tracing
    pub fn log_warnings(warnings: &[SecurityWarning]) {
        for warning in warnings {
            match warning.severity {
                WarningSeverity::Critical => {
                    tracing::error!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Security configuration issue"
                    );
                },
                WarningSeverity::Warning => {
                    tracing::warn!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Security configuration warning"
                    );
                },
                WarningSeverity::Info => {
                    tracing::info!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Security configuration notice"
                    );
                },
            }
        }
    }

    fn check_jwt_secret(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        let severity = if is_production {
            WarningSeverity::Critical
        } else {
            WarningSeverity::Warning
        };

        let Some(secret) = config.security.jwt_secret.as_ref() else {
            warnings.push(SecurityWarning::new(
                severity,
                "SEC001",
                "No JWT signing secret configured, using the built-in development secret",
                "Set SESSIONGUARD_SECURITY__JWT_SECRET to a random value of at least 32 bytes",
            ));
            return;
        };

        let secret = secret.expose_secret();
        if secret == DEV_JWT_SECRET {
            warnings.push(SecurityWarning::new(
                severity,
                "SEC001",
                "JWT signing secret is the built-in development secret",
                "Set SESSIONGUARD_SECURITY__JWT_SECRET to a random value of at least 32 bytes",
            ));
        } else if secret.len() < MIN_JWT_SECRET_LEN {
            warnings.push(SecurityWarning::new(
                severity,
                "SEC002",
                format!(
                    "JWT signing secret is shorter than {MIN_JWT_SECRET_LEN} bytes ({} bytes)",
                    secret.len()
                ),
                "Generate a longer secret, e.g. `openssl rand -base64 48`",
            ));
        }
    }

    fn check_token_lifetime(config: &AppConfig, warnings: &mut Vec<SecurityWarning>) {
        let ttl = config.security.token_ttl_secs;
        if ttl == 0 {
            warnings.push(SecurityWarning::warning(
                "SEC003",
                "Token lifetime is zero, every issued token expires immediately",
                "Set security.token_ttl_secs to a positive value",
            ));
        } else if ttl > MAX_RECOMMENDED_TTL_SECS {
            warnings.push(SecurityWarning::info(
                "SEC003",
                format!("Token lifetime of {ttl}s exceeds one day"),
                "Prefer short-lived tokens and use the refresh endpoint",
            ));
        }
    }

    fn check_cors_configuration(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        if config.server.cors_enabled && config.server.allowed_origins.is_empty() {
            let severity = if is_production {
                WarningSeverity::Critical
            } else {
                WarningSeverity::Info
            };

            warnings.push(SecurityWarning::new(
                severity,
                "SEC004",
                "CORS is enabled with no origin restrictions (allows all origins)",
                "Specify allowed_origins in production to restrict cross-origin requests",
            ));
        }
    }

    fn check_rate_limiting(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        if !config.security.rate_limit_enabled {
            if is_production {
                warnings.push(SecurityWarning::critical(
                    "SEC005",
                    "Rate limiting is disabled in production",
                    "Enable rate_limit_enabled to protect login against brute force",
                ));
            }
            return;
        }

        let covers_login = config
            .security
            .rate_limits
            .iter()
            .any(|rule| rule.matches(LOGIN_PATH));
        if !covers_login {
            warnings.push(SecurityWarning::warning(
                "SEC006",
                "No rate limit rule covers the login endpoint",
                "Add a rate_limits rule with path_prefix \"/auth/login\"",
            ));
        }

        if let Some(rule) = config
            .security
            .rate_limits
            .iter()
            .find(|rule| rule.max_attempts == 0)
        {
            warnings.push(SecurityWarning::info(
                "SEC007",
                format!("Rate limit rule for {} admits no requests", rule.path_prefix),
                "Raise max_attempts or remove the rule",
            ));
        }
    }

    fn check_seed_users(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        let unhashed = Argon2PasswordHasher::count_unhashed(
            config.users.iter().map(|u| u.password_hash.as_str()),
        );
        if unhashed > 0 {
            let severity = if is_production {
                WarningSeverity::Critical
            } else {
                WarningSeverity::Warning
            };

            warnings.push(SecurityWarning::new(
                severity,
                "SEC008",
                format!("{unhashed} seed user(s) have a password that is not an Argon2 hash"),
                "Store Argon2id PHC strings in users[].password_hash",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::{Environment, SeedUserConfig};

    const STRONG_SECRET: &str = "0123456789abcdef0123456789abcdef-strong";

    fn create_test_config() -> AppConfig {
        AppConfig::default()
    }

    fn create_production_config() -> AppConfig {
        AppConfig {
            environment: Some(Environment::Production),
            ..Default::default()
        }
    }

    fn secure_production_config() -> AppConfig {
        let mut config = create_production_config();
        config.security.jwt_secret = Some(SecretString::from(STRONG_SECRET));
        config.server.allowed_origins = vec!["https://example.com".to_string()];
        config
    }

    #[test]
    fn validate_has_no_critical_for_secure_production_config() {
        let warnings = SecurityValidator::validate(&secure_production_config());

        assert!(warnings.iter().all(|w| !w.is_critical()), "{warnings:?}");
    }

    #[test]
    fn missing_secret_is_warning_in_development() {
        let warnings = SecurityValidator::validate(&create_test_config());

        let warning = warnings.iter().find(|w| w.code == "SEC001").unwrap();
        assert_eq!(warning.severity, WarningSeverity::Warning);
    }

    #[test]
    fn missing_secret_is_critical_in_production() {
        let warnings = SecurityValidator::validate(&create_production_config());

        let warning = warnings.iter().find(|w| w.code == "SEC001").unwrap();
        assert!(warning.is_critical());
    }

    #[test]
    fn explicit_dev_secret_is_flagged() {
        let mut config = secure_production_config();
        config.security.jwt_secret = Some(SecretString::from(DEV_JWT_SECRET));

        let warnings = SecurityValidator::validate(&config);

        assert!(warnings.iter().any(|w| w.code == "SEC001" && w.is_critical()));
    }

    #[test]
    fn short_secret_is_flagged() {
        let mut config = secure_production_config();
        config.security.jwt_secret = Some(SecretString::from("short"));

        let warnings = SecurityValidator::validate(&config);

        let warning = warnings.iter().find(|w| w.code == "SEC002").unwrap();
        assert!(warning.is_critical());
        assert!(warning.message.contains("5 bytes"));
    }

    #[test]
    fn zero_token_lifetime_is_flagged() {
        let mut config = create_test_config();
        config.security.token_ttl_secs = 0;

        let warnings = SecurityValidator::validate(&config);

        let warning = warnings.iter().find(|w| w.code == "SEC003").unwrap();
        assert_eq!(warning.severity, WarningSeverity::Warning);
    }

    #[test]
    fn validate_critical_cors_in_production() {
        let mut config = secure_production_config();
        config.server.allowed_origins.clear();

        let warnings = SecurityValidator::validate(&config);

        let cors_warning = warnings.iter().find(|w| w.code == "SEC004").unwrap();
        assert!(cors_warning.is_critical());
    }

    #[test]
    fn validate_info_cors_in_development() {
        let warnings = SecurityValidator::validate(&create_test_config());

        let cors_warning = warnings.iter().find(|w| w.code == "SEC004").unwrap();
        assert_eq!(cors_warning.severity, WarningSeverity::Info);
    }

    #[test]
    fn disabled_rate_limit_is_critical_in_production() {
        let mut config = secure_production_config();
        config.security.rate_limit_enabled = false;

        let warnings = SecurityValidator::validate(&config);

        assert!(warnings.iter().any(|w| w.code == "SEC005" && w.is_critical()));
    }

    #[test]
    fn disabled_rate_limit_is_silent_in_development() {
        let mut config = create_test_config();
        config.security.rate_limit_enabled = false;

        let warnings = SecurityValidator::validate(&config);

        assert!(!warnings.iter().any(|w| w.code == "SEC005"));
    }

    #[test]
    fn missing_login_rule_is_flagged() {
        let mut config = create_test_config();
        config.security.rate_limits.retain(|rule| rule.path_prefix != "/auth/login");

        let warnings = SecurityValidator::validate(&config);

        assert!(warnings.iter().any(|w| w.code == "SEC006"));
    }

    #[test]
    fn broader_prefix_covers_login() {
        let mut config = create_test_config();
        config.security.rate_limits[0].path_prefix = "/auth".to_string();

        let warnings = SecurityValidator::validate(&config);

        assert!(!warnings.iter().any(|w| w.code == "SEC006"));
    }

    #[test]
    fn plaintext_seed_password_is_flagged() {
        let mut config = secure_production_config();
        config.users.push(SeedUserConfig {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            password_hash: "hunter2".to_string(),
        });

        let warnings = SecurityValidator::validate(&config);

        assert!(warnings.iter().any(|w| w.code == "SEC008" && w.is_critical()));
    }

    #[test]
    fn should_block_startup_in_production_with_critical() {
        let config = create_production_config();
        let warnings = vec![SecurityWarning::critical("TEST", "Test critical", "Fix it")];

        assert!(SecurityValidator::blocks_startup(&config, &warnings, false));
    }

    #[test]
    fn override_allows_insecure_startup() {
        let config = create_production_config();
        let warnings = vec![SecurityWarning::critical("TEST", "Test critical", "Fix it")];

        assert!(!SecurityValidator::blocks_startup(&config, &warnings, true));
    }

    #[test]
    fn should_not_block_startup_in_development() {
        let config = create_test_config();
        let warnings = vec![SecurityWarning::critical("TEST", "Test critical", "Fix it")];

        assert!(!SecurityValidator::should_block_startup(&config, &warnings));
    }

    #[test]
    fn should_not_block_startup_without_critical() {
        let config = create_production_config();
        let warnings = vec![SecurityWarning::warning("TEST", "Test warning", "Fix it")];

        assert!(!SecurityValidator::blocks_startup(&config, &warnings, false));
    }

    #[test]
    fn warnings_sorted_by_severity() {
        let warnings = SecurityValidator::validate(&create_production_config());

        assert!(warnings.len() > 1);
        assert!(warnings.windows(2).all(|w| w[0].severity >= w[1].severity));
    }

    #[test]
    fn warning_display_format() {
        let warning = SecurityWarning::critical("SEC001", "Test message", "Test recommendation");

        let display = format!("{warning}");

        assert!(display.contains("CRITICAL"));
        assert!(display.contains("SEC001"));
        assert!(display.contains("Test message"));
        assert!(display.contains("Test recommendation"));
    }

    #[test]
    fn severity_ordering() {
        assert!(WarningSeverity::Critical > WarningSeverity::Warning);
        assert!(WarningSeverity::Warning > WarningSeverity::Info);
    }
}
