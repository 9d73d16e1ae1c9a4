//! Monotonic clock abstraction. Replaces direct `Instant::now()` reads
//! so that the request-timeout sweep in `dispatcher` is deterministic in
//! tests.

use std::time::Instant;

pub trait Clock: std::fmt::Debug {
    fn now(&self) -> Instant;
}

/// Real wall-clock time, used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that always returns a fixed instant, and can be advanced
/// manually. Lets tests construct "ancient" `RequestSlot`s without
/// sleeping.
#[derive(Debug, Clone)]
pub struct TestClock {
    now: std::cell::Cell<Instant>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: std::cell::Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: std::time::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
