//! # Time Source
//!
//! Abstracted clock so ledger timestamps and claim cooldowns can be tested
//! with deterministic time.

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

/// Time source for consistent timestamp handling.
pub trait TimeSource: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Current unix time in seconds.
    fn unix_secs(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests.
#[derive(Debug)]
pub struct ManualTimeSource {
    now: Mutex<DateTime<Utc>>,
}

impl ManualTimeSource {
    pub fn new(initial: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(initial),
        }
    }

    /// Start at the given unix second.
    pub fn at_unix(secs: i64) -> Self {
        let initial = Utc
            .timestamp_opt(secs, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::new(initial)
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
