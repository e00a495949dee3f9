//! Rate limit counter cleanup task
//!
//! Periodically drops counters whose window has elapsed so the tables do
//! not grow with every client address ever seen.

use std::{sync::Arc, time::Duration};

use application::ports::LoginRateLimiterPort;
use tracing::{debug, info};

/// Spawn a background task that purges elapsed rate limit counters.
///
/// Returns a `JoinHandle` that can be used to abort the task when shutting down.
///
/// # Example
///
/// ```ignore
/// let limiters = state.rate_limits.iter().map(RateLimitRule::limiter).collect();
/// let cleanup_handle = spawn_rate_limit_cleanup_task(limiters, Duration::from_secs(300));
///
/// // On shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_rate_limit_cleanup_task(
    limiters: Vec<Arc<dyn LoginRateLimiterPort>>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    info!(
        limiters = limiters.len(),
        interval_secs = interval.as_secs(),
        "Starting rate limit cleanup task"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Don't run immediately on startup
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = purge_all(&limiters);
            if removed > 0 {
                info!(removed_count = removed, "Purged elapsed rate limit counters");
            } else {
                debug!("No rate limit counters to purge");
            }
        }
    })
}

fn purge_all(limiters: &[Arc<dyn LoginRateLimiterPort>]) -> usize {
    limiters.iter().map(|limiter| limiter.purge_expired()).sum()
}
