//! Rate limit attempt counter

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of recording an attempt against an [`AttemptRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptDecision {
    /// The attempt was admitted and counted
    Allowed,
    /// The window is exhausted; nothing was recorded
    Denied,
}

impl AttemptDecision {
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Attempt counter for one identifier under fixed-window-reset semantics
///
/// The window restarts wholesale on the first attempt made more than
/// `window` after the previous one. Inside the window at most `max_attempts`
/// attempts are admitted; denied attempts leave the record untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub count: u32,
    pub last_attempt: DateTime<Utc>,
}

impl AttemptRecord {
    /// A record holding the first attempt of a window
    pub const fn first(at: DateTime<Utc>) -> Self {
        Self {
            count: 1,
            last_attempt: at,
        }
    }

    /// Whether more than `window` has passed since the last attempt
    pub fn window_elapsed(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.last_attempt > window
    }

    /// Apply one attempt at `now`, mutating the record only when admitted
    pub fn register_attempt(
        &mut self,
        now: DateTime<Utc>,
        window: Duration,
        max_attempts: u32,
    ) -> AttemptDecision {
        if self.window_elapsed(now, window) {
            *self = Self::first(now);
            return AttemptDecision::Allowed;
        }

        if self.count < max_attempts {
            self.count += 1;
            self.last_attempt = now;
            AttemptDecision::Allowed
        } else {
            AttemptDecision::Denied
        }
    }
}
