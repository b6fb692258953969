//! Clock abstraction and expiry predicate
//!
//! Expiry is a comparison of two unix timestamps, kept as a pure function
//! so it is testable without waiting on a real clock. The session takes a
//! `Clock` implementation; production uses [`SystemClock`].

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time, in unix seconds.
pub trait Clock: Send + Sync {
    fn now_unix_secs(&self) -> u64;
}

/// System clock implementation using the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Whether an access token is expired at `now`.
///
/// A token with no recorded expiry is treated as still valid; a token is
/// invalid at and after its expiry instant.
pub fn is_expired(now: u64, expires_at: Option<u64>) -> bool {
    match expires_at {
        Some(expiry) => now >= expiry,
        None => false,
    }
}

/// Adjustable clock for tests that need simulated time.
#[cfg(test)]
pub(crate) mod test_clock {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::Clock;

    pub struct ManualClock(AtomicU64);

    impl ManualClock {
        pub fn new(now: u64) -> Self {
            Self(AtomicU64::new(now))
        }

        pub fn advance(&self, secs: u64) {
            self.0.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_unix_secs(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_expiry_means_valid() {
        assert!(!is_expired(u64::MAX, None));
    }

    #[test]
    fn before_expiry_is_valid() {
        assert!(!is_expired(99, Some(100)));
    }

    #[test]
    fn at_expiry_is_expired() {
        assert!(is_expired(100, Some(100)));
    }

    #[test]
    fn after_expiry_is_expired() {
        assert!(is_expired(101, Some(100)));
    }

    #[test]
    fn system_clock_returns_reasonable_timestamp() {
        let now = SystemClock.now_unix_secs();
        // Anything after 2020-01-01 counts as reasonable
        assert!(now > 1_577_836_800);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = test_clock::ManualClock::new(1_000);
        assert_eq!(clock.now_unix_secs(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_unix_secs(), 1_500);
    }
}
