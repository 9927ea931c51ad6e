//! # Rate Limiter
//!
//! Per-actor sliding-window limiter gating repeated command invocation
//! before it reaches the transition engine.
//!
//! ## Scope
//!
//! This is a best-effort abuse filter, not a correctness mechanism:
//! - State is process-local and resets on restart
//! - It is injected as an `ActionRateLimiter` trait object so a distributed
//!   implementation can replace it without touching the services

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The hit was recorded and the action may proceed.
    Allowed { remaining: u32 },
    /// The window is full; retry after the given delay.
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Injected rate-limit gate.
pub trait ActionRateLimiter: Send + Sync {
    /// Record a hit for `(actor, action)` and decide whether it may proceed.
    fn check(&self, actor: &str, action: &str) -> RateDecision;
}

/// Limiter that never limits. Useful for tests and batch jobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlimitedRateLimiter;

impl ActionRateLimiter for UnlimitedRateLimiter {
    fn check(&self, _actor: &str, _action: &str) -> RateDecision {
        RateDecision::Allowed {
            remaining: u32::MAX,
        }
    }
}

/// Sliding-window counter keyed by `(actor, action)`.
///
/// # Algorithm
///
/// - Each key keeps the instants of its hits inside the window
/// - Hits older than the window are dropped on every check of that key
/// - Every `sweep_interval` checks, keys with no hit inside the window are
///   evicted so idle actors do not accumulate
/// - If `max_tracked` keys are held after a sweep, the key with the oldest
///   newest-hit is evicted to make room
pub struct SlidingWindowLimiter {
    /// Maximum hits per window.
    max_hits: u32,
    /// Window length.
    window: Duration,
    /// Checks between eviction sweeps.
    sweep_interval: u64,
    /// Upper bound on tracked keys.
    max_tracked: usize,
    state: Mutex<LimiterState>,
}

#[derive(Default)]
struct LimiterState {
    hits: HashMap<(String, String), VecDeque<Instant>>,
    checks_since_sweep: u64,
}

impl SlidingWindowLimiter {
    /// Default sweep interval.
    pub const DEFAULT_SWEEP_INTERVAL: u64 = 256;

    /// Default upper bound on tracked `(actor, action)` keys.
    pub const DEFAULT_MAX_TRACKED: usize = 100_000;

    /// Create a limiter allowing `max_hits` per `window`.
    pub fn new(max_hits: u32, window: Duration) -> Self {
        Self::with_params(
            max_hits,
            window,
            Self::DEFAULT_SWEEP_INTERVAL,
            Self::DEFAULT_MAX_TRACKED,
        )
    }

    /// Create with custom eviction parameters.
    pub fn with_params(
        max_hits: u32,
        window: Duration,
        sweep_interval: u64,
        max_tracked: usize,
    ) -> Self {
        Self {
            max_hits: max_hits.max(1),
            window,
            sweep_interval: sweep_interval.max(1),
            max_tracked: max_tracked.max(1),
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Deterministic variant of `check` for a caller-supplied instant.
    pub fn check_at(&self, actor: &str, action: &str, now: Instant) -> RateDecision {
        let mut state = self.state.lock();

        state.checks_since_sweep += 1;
        if state.checks_since_sweep >= self.sweep_interval {
            state.checks_since_sweep = 0;
            self.sweep(&mut state, now);
        }

        let key = (actor.to_string(), action.to_string());
        if !state.hits.contains_key(&key) && state.hits.len() >= self.max_tracked {
            self.evict_stalest(&mut state);
        }

        let window = self.window;
        let hits = state.hits.entry(key).or_default();
        while let Some(oldest) = hits.front() {
            if now.saturating_duration_since(*oldest) >= window {
                hits.pop_front();
            } else {
                break;
            }
        }

        if hits.len() as u32 >= self.max_hits {
            let retry_after = hits
                .front()
                .map(|oldest| window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(window);
            debug!(actor, action, ?retry_after, "rate limited");
            return RateDecision::Limited { retry_after };
        }

        hits.push_back(now);
        RateDecision::Allowed {
            remaining: self.max_hits - hits.len() as u32,
        }
    }

    /// Number of tracked `(actor, action)` keys.
    pub fn tracked(&self) -> usize {
        self.state.lock().hits.len()
    }

    /// Drop every key whose newest hit fell out of the window.
    fn sweep(&self, state: &mut LimiterState, now: Instant) {
        let window = self.window;
        let before = state.hits.len();
        state.hits.retain(|_, hits| {
            hits.back()
                .map(|newest| now.saturating_duration_since(*newest) < window)
                .unwrap_or(false)
        });
        let evicted = before - state.hits.len();
        if evicted > 0 {
            debug!(evicted, "rate limiter sweep");
        }
    }

    fn evict_stalest(&self, state: &mut LimiterState) {
        let stalest = state
            .hits
            .iter()
            .min_by_key(|(_, hits)| hits.back().copied())
            .map(|(key, _)| key.clone());
        if let Some(key) = stalest {
            state.hits.remove(&key);
        }
    }
}

impl ActionRateLimiter for SlidingWindowLimiter {
    fn check(&self, actor: &str, action: &str) -> RateDecision {
        self.check_at(actor, action, Instant::now())
    }
}

/// Pre-configured limiters for common use cases.
pub mod presets {
    use super::SlidingWindowLimiter;
    use std::time::Duration;

    /// Economy commands (5 per 10s per actor and command).
    pub fn economy_commands() -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(5, Duration::from_secs(10))
    }

    /// Administrative rollbacks (3 per minute).
    pub fn rollbacks() -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(3, Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_within_window() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(10));
        let now = Instant::now();

        assert_eq!(
            limiter.check_at("a", "pay", now),
            RateDecision::Allowed { remaining: 2 }
        );
        assert!(limiter.check_at("a", "pay", now).is_allowed());
        assert!(limiter.check_at("a", "pay", now).is_allowed());
    }

    #[test]
    fn test_limits_over_window() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(10));
        let now = Instant::now();

        limiter.check_at("a", "pay", now);
        limiter.check_at("a", "pay", now + Duration::from_secs(4));

        match limiter.check_at("a", "pay", now + Duration::from_secs(5)) {
            RateDecision::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(5));
            }
            other => panic!("expected limited, got {other:?}"),
        }
    }

    #[test]
    fn test_window_slides() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(10));
        let now = Instant::now();

        assert!(limiter.check_at("a", "pay", now).is_allowed());
        assert!(!limiter.check_at("a", "pay", now + Duration::from_secs(9)).is_allowed());
        assert!(limiter.check_at("a", "pay", now + Duration::from_secs(10)).is_allowed());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(10));
        let now = Instant::now();

        assert!(limiter.check_at("a", "pay", now).is_allowed());
        assert!(limiter.check_at("b", "pay", now).is_allowed());
        assert!(limiter.check_at("a", "craft", now).is_allowed());
        assert!(!limiter.check_at("a", "pay", now).is_allowed());
    }

    #[test]
    fn test_sweep_evicts_idle_actors() {
        let limiter = SlidingWindowLimiter::with_params(5, Duration::from_secs(1), 3, 100);
        let now = Instant::now();

        limiter.check_at("a", "pay", now);
        limiter.check_at("b", "pay", now);
        assert_eq!(limiter.tracked(), 2);

        // Third check triggers a sweep; a and b are idle by then.
        limiter.check_at("c", "pay", now + Duration::from_secs(5));
        assert_eq!(limiter.tracked(), 1);
    }

    #[test]
    fn test_capacity_bound_evicts_stalest() {
        let limiter = SlidingWindowLimiter::with_params(5, Duration::from_secs(60), 1_000, 2);
        let now = Instant::now();

        limiter.check_at("a", "pay", now);
        limiter.check_at("b", "pay", now + Duration::from_secs(1));
        limiter.check_at("c", "pay", now + Duration::from_secs(2));

        assert_eq!(limiter.tracked(), 2);
    }

    #[test]
    fn test_unlimited() {
        let limiter = UnlimitedRateLimiter;
        for _ in 0..1_000 {
            assert!(limiter.check("a", "pay").is_allowed());
        }
    }

    #[test]
    fn test_presets() {
        let limiter = presets::economy_commands();
        let now = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check_at("a", "daily", now).is_allowed());
        }
        assert!(!limiter.check_at("a", "daily", now).is_allowed());
    }
}
