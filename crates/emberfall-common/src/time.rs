//! Millisecond timestamps and clocks.
//!
//! The simulation reads wall-clock milliseconds. Every operation takes the
//! current time explicitly; a [`Clock`] is only consulted by the host loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock timestamp or duration in milliseconds.
pub type Millis = u64;

/// Source of the current time.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> Millis;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as Millis)
    }
}

/// Manually advanced clock for tests and headless runs.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock starting at `start` milliseconds.
    #[must_use]
    pub fn new(start: Millis) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, delta: Millis) {
        self.now.fetch_add(delta, Ordering::Relaxed);
    }

    /// Sets the clock to an absolute time.
    pub fn set(&self, now: Millis) {
        self.now.store(now, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::Relaxed)
    }
}

/// Milliseconds elapsed between `since` and `now`, zero if `since` is later.
#[must_use]
pub fn elapsed(now: Millis, since: Millis) -> Millis {
    now.saturating_sub(since)
}
