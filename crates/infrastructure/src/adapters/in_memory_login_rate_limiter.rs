//! In-memory login rate limiter adapter
//!
//! Fixed-window-reset counters per identifier. The check and the increment
//! happen under one write lock, so concurrent attempts for the same
//! identifier can never admit more than `max_attempts` per window.

use std::collections::HashMap;

use application::ports::{LoginRateLimiterPort, RateLimitPolicy};
use chrono::{DateTime, Utc};
use domain::{AttemptDecision, AttemptRecord};
use parking_lot::RwLock;
use tracing::{debug, warn};

/// Process-local implementation of [`LoginRateLimiterPort`]
#[derive(Debug)]
pub struct InMemoryLoginRateLimiter {
    records: RwLock<HashMap<String, AttemptRecord>>,
    policy: RateLimitPolicy,
}

impl InMemoryLoginRateLimiter {
    /// Create a limiter enforcing the given policy
    #[must_use]
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            policy,
        }
    }

    /// Record an attempt for `identifier` as of `now`
    pub fn check_at(&self, identifier: &str, now: DateTime<Utc>) -> bool {
        let window = self.policy.window();
        let mut records = self.records.write();

        let decision = match records.get_mut(identifier) {
            Some(record) => record.register_attempt(now, window, self.policy.max_attempts),
            None if self.policy.max_attempts == 0 => AttemptDecision::Denied,
            None => {
                records.insert(identifier.to_string(), AttemptRecord::first(now));
                AttemptDecision::Allowed
            },
        };
        drop(records);

        if decision.is_allowed() {
            debug!(identifier, "Attempt admitted");
        } else {
            warn!(
                identifier,
                max_attempts = self.policy.max_attempts,
                window_secs = self.policy.window_secs,
                "Rate limit exceeded"
            );
        }
        decision.is_allowed()
    }

    /// Drop counters whose window has elapsed as of `now`
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let window = self.policy.window();
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, record| !record.window_elapsed(now, window));
        before - records.len()
    }

    /// Number of identifiers currently tracked
    #[must_use]
    pub fn tracked_identifiers(&self) -> usize {
        self.records.read().len()
    }
}

impl Default for InMemoryLoginRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

impl LoginRateLimiterPort for InMemoryLoginRateLimiter {
    fn is_allowed(&self, identifier: &str) -> bool {
        self.check_at(identifier, Utc::now())
    }

    fn attempts(&self, identifier: &str) -> Option<AttemptRecord> {
        self.records.read().get(identifier).copied()
    }

    fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }
}
