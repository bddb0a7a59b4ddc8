//! Clock Module
//!
//! Monotonic time sources used to stamp and age TTL entries.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// == Clock Trait ==
/// A monotonic time source.
///
/// Readings are durations since an arbitrary, fixed origin. Only differences
/// between two readings of the same clock are meaningful.
pub trait Clock: Debug + Send + Sync {
    /// Returns the current reading.
    fn now(&self) -> Duration;
}

// == Monotonic Clock ==
/// Clock backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

// == Manual Clock ==
/// Clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle while the
/// cache owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `start_ms` milliseconds.
    pub fn new(start_ms: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Sets the reading to `ms` milliseconds.
    pub fn set_millis(&self, ms: u64) {
        self.millis.store(ms, Ordering::SeqCst);
    }

    /// Moves the reading forward by `ms` milliseconds.
    pub fn advance_millis(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}
