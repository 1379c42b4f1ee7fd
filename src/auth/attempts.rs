//! Per-username login failure tracking with a timed lockout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::clock::Clock;

#[derive(Clone, Copy, Debug)]
struct AttemptRecord {
    failures: u32,
    last_failure_unix: i64,
}

/// Counts failed logins per username and blocks a username once the failure
/// threshold is reached, until the lockout window since the most recent
/// failure has elapsed.
///
/// State is process-local and never persisted; a multi-instance deployment
/// needs a shared backing store behind the same interface.
pub struct LoginAttemptTracker {
    max_failures: u32,
    window_seconds: i64,
    clock: Arc<dyn Clock>,
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl LoginAttemptTracker {
    #[must_use]
    pub fn new(max_failures: u32, window_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_failures,
            window_seconds,
            clock,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// True while `username` has reached the failure threshold within the
    /// lockout window. Unknown usernames are never blocked. A record whose
    /// window has elapsed is pruned on observation.
    pub fn is_blocked(&self, username: &str) -> bool {
        let now = self.clock.unix_seconds();
        let mut records = self.lock();
        match records.get(username) {
            Some(record) if record.failures >= self.max_failures => {
                if now - record.last_failure_unix < self.window_seconds {
                    true
                } else {
                    records.remove(username);
                    false
                }
            }
            _ => false,
        }
    }

    /// Record a failed attempt, creating the record on first failure.
    pub fn login_failed(&self, username: &str) {
        let now = self.clock.unix_seconds();
        let mut records = self.lock();
        let record = records
            .entry(username.to_string())
            .or_insert(AttemptRecord {
                failures: 0,
                last_failure_unix: now,
            });
        record.failures = record.failures.saturating_add(1);
        record.last_failure_unix = now;
        debug!(
            "recorded failed login for {username}: {failures} failures",
            failures = record.failures
        );
    }

    /// Clear all failure state for `username`.
    pub fn reset_attempts(&self, username: &str) {
        self.lock().remove(username);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, AttemptRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
