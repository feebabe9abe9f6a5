//! C11: Rate Limiter.
//!
//! Per-client token bucket guarding the public entry point, wrapping C10
//! entirely: an exhausted bucket rejects the request with a 429 without
//! ever touching C1–C10 (§4.9). Token-acquisition is non-blocking (§5):
//! [`RateLimiter::check`] returns a decision immediately, never awaits.
//!
//! Grounded in spirit on the workspace's gas-budget module (check before
//! the operation runs, no overdraft, immutable costs) but implemented on
//! top of `governor`'s keyed GCRA limiter rather than hand-rolled
//! counters — the pack already reaches for `governor` for exactly this
//! per-key token-bucket shape.

use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Bucket capacity and per-minute refill rate (§4.9 default 30/30).
    pub capacity: u32,
    pub refill_per_minute: u32,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self { capacity: 30, refill_per_minute: 30 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Seconds until the next token is expected to become available.
    Limited { retry_after_secs: u64 },
}

/// Per-client-identity token bucket (§3 "Rate-limiter bucket").
pub struct RateLimiter {
    inner: GovernorLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>,
    clock: DefaultClock,
}

impl RateLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        let capacity = NonZeroU32::new(config.capacity.max(1)).unwrap();
        let refill = NonZeroU32::new(config.refill_per_minute.max(1)).unwrap();
        let quota = Quota::per_minute(refill).allow_burst(capacity);
        Self {
            inner: GovernorLimiter::keyed(quota),
            clock: DefaultClock::default(),
        }
    }

    /// Non-blocking decision for `client_id` (e.g. the remote address).
    pub fn check(&self, client_id: &str) -> Decision {
        match self.inner.check_key(&client_id.to_string()) {
            Ok(()) => Decision::Allowed,
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.clock.now());
                Decision::Limited {
                    retry_after_secs: wait.as_secs().max(1),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_capacity_then_limits() {
        let limiter = RateLimiter::new(LimiterConfig { capacity: 30, refill_per_minute: 30 });
        for i in 0..30 {
            assert_eq!(limiter.check("client-a"), Decision::Allowed, "request {i} should be allowed");
        }
        match limiter.check("client-a") {
            Decision::Limited { .. } => {}
            Decision::Allowed => panic!("31st request should be limited"),
        }
    }

    #[test]
    fn clients_are_independent() {
        let limiter = RateLimiter::new(LimiterConfig { capacity: 2, refill_per_minute: 2 });
        assert_eq!(limiter.check("a"), Decision::Allowed);
        assert_eq!(limiter.check("a"), Decision::Allowed);
        assert!(matches!(limiter.check("a"), Decision::Limited { .. }));
        // "b" has its own bucket, untouched by "a"'s usage.
        assert_eq!(limiter.check("b"), Decision::Allowed);
    }
}
