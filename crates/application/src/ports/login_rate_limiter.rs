//! Login rate limiter port

use chrono::Duration;
use domain::AttemptRecord;
#[cfg(test)]
use mockall::automock;

/// Default number of admitted attempts per window
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default window length in seconds (15 minutes)
pub const DEFAULT_WINDOW_SECS: u64 = 15 * 60;

/// Limits for one fixed-window-reset counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_attempts: u32,
    pub window_secs: u64,
}

impl RateLimitPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, window_secs: u64) -> Self {
        Self {
            max_attempts,
            window_secs,
        }
    }

    /// Window as a chrono duration
    pub fn window(&self) -> Duration {
        i64::try_from(self.window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_SECS)
    }
}

/// Port for counting attempts per identifier
///
/// Identifiers are opaque strings such as `ip:1.2.3.4`.
#[cfg_attr(test, automock)]
pub trait LoginRateLimiterPort: Send + Sync {
    /// Record an attempt and decide whether it is admitted
    fn is_allowed(&self, identifier: &str) -> bool;

    /// Current counter for an identifier, if any
    fn attempts(&self, identifier: &str) -> Option<AttemptRecord>;

    /// The policy this limiter enforces
    fn policy(&self) -> RateLimitPolicy;

    /// Drop counters whose window has elapsed, returning how many went
    ///
    /// Such counters would be reset by the next attempt anyway, so purging
    /// them never changes a decision.
    fn purge_expired(&self) -> usize;
}
