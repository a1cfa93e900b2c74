//! Time and identity capabilities.
//!
//! Secrets and collections never read the system clock or mint ids on their own.
//! The [`Handler`](crate::Handler) passes these capabilities down, which keeps
//! timestamps and ids deterministic under test.

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of "now" for `created`/`updated` timestamps.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh secret ids.
pub trait IdGenerator: Debug + Send + Sync {
    fn next_id(&self) -> String;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock.
///
/// Every call to [`Clock::now`] returns the current reading and then advances it by
/// the configured step, so successive mutations observe strictly increasing times.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl FixedClock {
    /// A clock frozen at `start`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self::stepping(start, TimeDelta::zero())
    }

    /// A clock that starts at `start` and moves forward by `step` on every read.
    #[must_use]
    pub const fn stepping(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self { current: Mutex::new(start), step }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.current.lock() = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut current = self.current.lock();
        *current += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let mut current = self.current.lock();
        let now = *current;
        *current += self.step;
        now
    }
}

/// Random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Predictable UUID-shaped ids counting up from 1.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Uuid::from_u128(u128::from(n)).to_string()
    }
}
