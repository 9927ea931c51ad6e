//! Attempt configuration.

use rand::Rng;
use std::time::Duration;

/// Attempts made before a conflict is surfaced.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Per-call knobs for `TransitionEngine::attempt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptConfig {
    /// Upper bound on read/compute/commit cycles. 0 is treated as 1.
    pub max_attempts: u32,
    /// Debt allowed, item removal clamped, status gate skipped.
    pub force: bool,
    /// Pause between a conflict and the next attempt.
    pub backoff: Option<Backoff>,
}

impl Default for AttemptConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            force: false,
            backoff: None,
        }
    }
}

impl AttemptConfig {
    /// Default attempts, forced mode.
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Effective attempt count.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Exponential backoff with full jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Upper bound of the pause after the `attempt`-th failure (1-based).
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base
            .checked_mul(1u32 << shift)
            .unwrap_or(self.max)
            .min(self.max)
    }

    /// Random pause in `[0, ceiling(attempt)]`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let ceiling = self.ceiling(attempt).as_micros() as u64;
        if ceiling == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(rand::thread_rng().gen_range(0..=ceiling))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(5), Duration::from_millis(200))
    }
}
