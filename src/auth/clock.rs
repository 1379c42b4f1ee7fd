//! Injectable time source for lockout accounting and token expiry.

use std::sync::atomic::{AtomicI64, Ordering};

/// Unix-seconds time source. Constructor-injected so lockout windows and
/// token expiry can be driven by a manual clock in tests.
pub trait Clock: Send + Sync {
    fn unix_seconds(&self) -> i64;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock advanced by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn unix_seconds(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, SystemClock};

    #[test]
    fn manual_clock_advances_and_sets() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.unix_seconds(), 100);
        clock.advance(60);
        assert_eq!(clock.unix_seconds(), 160);
        clock.set(10);
        assert_eq!(clock.unix_seconds(), 10);
    }

    #[test]
    fn system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.unix_seconds() > 1_577_836_800);
    }
}
