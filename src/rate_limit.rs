//! Fixed-window request governor.
//!
//! Every key owns one counter that resets once its window has fully elapsed.
//! Fixed windows let a caller burst up to twice the limit around a window
//! boundary (the tail of one window plus the head of the next); that is the
//! accepted behavior of this limiter.
//!
//! Records whose window has fully elapsed are swept at most once per window,
//! so keys that stop calling do not pile up.
//!
//! The table lives only in this process. Running several instances behind a
//! balancer multiplies the effective limit.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// Rate limit entry - tracks requests per IP/key
#[derive(Debug, Clone, Copy)]
pub struct RateRecord {
    pub count: u32,
    pub window_start: Instant,
}

// Outcome of a single admit call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_in: Duration,
}

impl RateDecision {
    pub fn reset_in_ms(&self) -> u64 {
        self.reset_in.as_millis() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub limit: u32,
    pub window: Duration,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            limit: 10,
            window: Duration::from_millis(60_000),
        }
    }
}

#[derive(Debug)]
pub struct RateGovernor {
    table: DashMap<String, RateRecord>,
    epoch: Instant,
    last_sweep_ms: AtomicU64, // offset from epoch
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self {
            table: DashMap::new(),
            epoch: Instant::now(),
            last_sweep_ms: AtomicU64::new(0),
        }
    }
}

impl RateGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&self, key: &str, limit: u32, window: Duration) -> RateDecision {
        self.admit_at(key, limit, window, Instant::now())
    }

    /// Same as [`RateGovernor::admit`] with an explicit clock reading.
    ///
    /// The entry guard holds the shard lock for the whole check-and-increment,
    /// so two concurrent calls for one key are serialized.
    pub fn admit_at(&self, key: &str, limit: u32, window: Duration, now: Instant) -> RateDecision {
        // must run before the entry guard below is taken
        self.sweep_expired(window, now);

        let mut record = self.table.entry(key.to_string()).or_insert(RateRecord {
            count: 0,
            window_start: now,
        });

        let elapsed = now.saturating_duration_since(record.window_start);

        // fresh key or window expired: start over
        if record.count == 0 || elapsed >= window {
            record.count = 1;
            record.window_start = now;
            return RateDecision {
                allowed: true,
                remaining: limit.saturating_sub(1),
                reset_in: window,
            };
        }

        let reset_in = window - elapsed;

        // over limit
        if record.count >= limit {
            return RateDecision {
                allowed: false,
                remaining: 0,
                reset_in,
            };
        }

        record.count += 1;
        RateDecision {
            allowed: true,
            remaining: limit - record.count,
            reset_in,
        }
    }

    // drop records whose window is over; one caller per window does the work
    fn sweep_expired(&self, window: Duration, now: Instant) {
        let since_epoch = now.saturating_duration_since(self.epoch).as_millis() as u64;
        let last = self.last_sweep_ms.load(Ordering::Relaxed);
        if since_epoch.saturating_sub(last) < window.as_millis() as u64 {
            return;
        }
        if self
            .last_sweep_ms
            .compare_exchange(last, since_epoch, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let before = self.table.len();
        self.table
            .retain(|_, r| now.saturating_duration_since(r.window_start) < window);
        tracing::debug!(before, after = self.table.len(), "swept expired rate records");
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    const WINDOW: Duration = Duration::from_millis(60_000);

    #[test]
    fn rejects_after_limit_within_window() {
        let governor = RateGovernor::new();
        let start = Instant::now();

        for i in 0..10 {
            let at = start + Duration::from_millis(i * 100);
            assert!(governor.admit_at("ip", 10, WINDOW, at).allowed, "request {}", i + 1);
        }

        let denied = governor.admit_at("ip", 10, WINDOW, start + Duration::from_secs(5));
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.reset_in, Duration::from_secs(55));
    }

    #[test]
    fn remaining_counts_down_by_one() {
        let governor = RateGovernor::new();
        let start = Instant::now();

        let first = governor.admit_at("ip", 5, WINDOW, start);
        assert_eq!(first.remaining, 4);
        assert_eq!(first.reset_in, WINDOW);

        let mut last = first.remaining;
        for step in 1..5u64 {
            let d = governor.admit_at("ip", 5, WINDOW, start + Duration::from_millis(step));
            assert!(d.allowed);
            assert_eq!(d.remaining, last - 1);
            assert!(d.remaining <= 4);
            last = d.remaining;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn window_expiry_starts_a_fresh_count() {
        let governor = RateGovernor::new();
        let start = Instant::now();

        for _ in 0..3 {
            governor.admit_at("ip", 3, WINDOW, start);
        }
        assert!(!governor.admit_at("ip", 3, WINDOW, start + WINDOW - Duration::from_millis(1)).allowed);

        let reopened = governor.admit_at("ip", 3, WINDOW, start + WINDOW);
        assert!(reopened.allowed);
        assert_eq!(reopened.remaining, 2);
        assert_eq!(reopened.reset_in, WINDOW);
    }

    #[test]
    fn keys_are_counted_independently() {
        let governor = RateGovernor::new();
        let now = Instant::now();

        assert!(governor.admit_at("a", 1, WINDOW, now).allowed);
        assert!(!governor.admit_at("a", 1, WINDOW, now).allowed);
        assert!(governor.admit_at("b", 1, WINDOW, now).allowed);
        assert_eq!(governor.tracked_keys(), 2);
    }

    #[test]
    fn expired_records_are_dropped() {
        let governor = RateGovernor::new();
        let window = Duration::from_millis(10);
        let start = Instant::now();

        for i in 0..10_000 {
            governor.admit_at(&format!("spoofed-{}", i), 10, window, start);
        }
        assert_eq!(governor.tracked_keys(), 10_000);

        let later = start + Duration::from_secs(3600);
        assert!(governor.admit_at("fresh", 10, window, later).allowed);
        assert_eq!(governor.tracked_keys(), 1);
    }

    #[test]
    fn live_records_survive_a_sweep() {
        let governor = RateGovernor::new();
        let start = Instant::now();

        governor.admit_at("old", 5, WINDOW, start);
        governor.admit_at("recent", 5, WINDOW, start + Duration::from_secs(50));
        governor.admit_at("recent", 5, WINDOW, start + Duration::from_secs(51));

        // sweep runs here: "old" has expired, "recent" has not
        governor.admit_at("other", 5, WINDOW, start + Duration::from_secs(61));
        assert_eq!(governor.tracked_keys(), 2);

        let d = governor.admit_at("recent", 5, WINDOW, start + Duration::from_secs(62));
        assert_eq!(d.remaining, 2);
    }

    #[test]
    fn boundary_burst_admits_twice_the_limit() {
        let governor = RateGovernor::new();
        let start = Instant::now();
        let mut admitted = 0;

        // end of the first window
        for _ in 0..4 {
            if governor.admit_at("ip", 4, WINDOW, start).allowed {
                admitted += 1;
            }
        }
        // start of the next one, a moment later in wall-clock terms
        for _ in 0..4 {
            if governor.admit_at("ip", 4, WINDOW, start + WINDOW).allowed {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 8);
    }

    #[test]
    fn concurrent_admits_never_exceed_limit() {
        let governor = Arc::new(RateGovernor::new());
        let allowed = Arc::new(AtomicU32::new(0));
        let now = Instant::now();

        std::thread::scope(|s| {
            for _ in 0..8 {
                let governor = Arc::clone(&governor);
                let allowed = Arc::clone(&allowed);
                s.spawn(move || {
                    for _ in 0..50 {
                        if governor.admit_at("shared", 100, WINDOW, now).allowed {
                            allowed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        assert_eq!(allowed.load(Ordering::Relaxed), 100);
    }
}
