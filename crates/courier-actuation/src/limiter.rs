//! Windowed admission control.
//!
//! Mirrors the server's own interaction limiter: at most `capacity` grants
//! per window of `window_ms`. A window opens on the first check after the
//! previous one expired.

use serde::{Deserialize, Serialize};

/// Limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in milliseconds.
    pub window_ms: u64,
    /// Grants allowed per window.
    pub capacity: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 6_000,
            capacity: 25,
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The action may fire now.
    Granted,
    /// The window is full; it reopens after `retry_after_ms`.
    Denied { retry_after_ms: u64 },
}

impl Admission {
    /// Whether admission was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Admission::Granted)
    }
}

/// Fixed-window rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    window_start: Option<u64>,
    count: u32,
}

impl RateLimiter {
    /// Create a limiter with no open window.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            window_start: None,
            count: 0,
        }
    }

    /// The limiter's configuration.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Adopt new limits. The open window and its grant count carry over, so
    /// a lowered capacity applies immediately.
    pub fn set_config(&mut self, config: RateLimitConfig) {
        self.config = config;
    }

    /// Grants used in the current window.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Check admission at `now_ms`, consuming a grant if one is available.
    pub fn allow(&mut self, now_ms: u64) -> Admission {
        let start = match self.window_start {
            Some(start) if now_ms.saturating_sub(start) < self.config.window_ms => start,
            _ => {
                self.window_start = Some(now_ms);
                self.count = 0;
                now_ms
            }
        };

        if self.count < self.config.capacity {
            self.count += 1;
            Admission::Granted
        } else {
            Admission::Denied {
                retry_after_ms: start
                    .saturating_add(self.config.window_ms)
                    .saturating_sub(now_ms),
            }
        }
    }

    /// Forget the current window.
    pub fn reset(&mut self) {
        self.window_start = None;
        self.count = 0;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn limiter(window_ms: u64, capacity: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            window_ms,
            capacity,
        })
    }

    #[test]
    fn test_double_capacity_grants_half() {
        let mut limiter = limiter(1_000, 5);
        let granted = (0..10)
            .filter(|i| limiter.allow(100 + i * 10).is_granted())
            .count();
        assert_eq!(granted, 5);
    }

    #[test]
    fn test_grants_again_after_window() {
        let mut limiter = limiter(1_000, 2);
        assert!(limiter.allow(0).is_granted());
        assert!(limiter.allow(10).is_granted());
        assert!(!limiter.allow(20).is_granted());
        assert!(!limiter.allow(999).is_granted());
        assert!(limiter.allow(1_000).is_granted());
        assert_eq!(limiter.count(), 1);
    }

    #[test]
    fn test_retry_after() {
        let mut limiter = limiter(6_000, 1);
        assert!(limiter.allow(1_000).is_granted());
        assert_eq!(
            limiter.allow(2_500),
            Admission::Denied {
                retry_after_ms: 4_500
            }
        );
    }

    #[test]
    fn test_zero_capacity_never_grants() {
        let mut limiter = limiter(100, 0);
        assert!(!limiter.allow(0).is_granted());
        assert!(!limiter.allow(500).is_granted());
    }

    #[test]
    fn test_clock_going_backwards_stays_in_window() {
        let mut limiter = limiter(1_000, 1);
        assert!(limiter.allow(5_000).is_granted());
        assert!(!limiter.allow(4_000).is_granted());
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let mut limiter = limiter(u64::MAX, 1);
        assert!(limiter.allow(5).is_granted());
        assert_eq!(
            limiter.allow(6),
            Admission::Denied {
                retry_after_ms: u64::MAX - 6
            }
        );
    }

    #[test]
    fn test_reset_opens_fresh_window() {
        let mut limiter = limiter(6_000, 1);
        assert!(limiter.allow(0).is_granted());
        assert!(!limiter.allow(100).is_granted());

        limiter.reset();
        assert_eq!(limiter.count(), 0);
        assert!(limiter.allow(200).is_granted());
    }

    #[test]
    fn test_raised_capacity_applies_to_open_window() {
        let mut limiter = limiter(6_000, 1);
        assert!(limiter.allow(0).is_granted());
        assert!(!limiter.allow(10).is_granted());

        limiter.set_config(RateLimitConfig {
            window_ms: 6_000,
            capacity: 3,
        });
        assert!(limiter.allow(20).is_granted());
        assert!(limiter.allow(30).is_granted());
        assert!(!limiter.allow(40).is_granted());
    }

    #[test]
    fn test_defaults_match_server() {
        let config = RateLimitConfig::default();
        assert_eq!(config.window_ms, 6_000);
        assert_eq!(config.capacity, 25);
    }

    proptest! {
        #[test]
        fn prop_within_one_window_grants_at_most_capacity(
            capacity in 1u32..50,
            offsets in proptest::collection::vec(0u64..1_000, 1..200),
        ) {
            let mut limiter = limiter(1_000, capacity);
            let mut offsets = offsets;
            offsets.sort_unstable();
            let granted = offsets
                .iter()
                .filter(|&&t| limiter.allow(t).is_granted())
                .count();
            prop_assert_eq!(granted, offsets.len().min(capacity as usize));
        }
    }
}
