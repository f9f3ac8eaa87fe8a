//! Time and id capabilities.
//!
//! Everything that would otherwise reach for the wall clock or a random
//! generator takes one of these instead, so tests can pin both.

use std::cell::Cell;

use rand::Rng;
use smol_str::{SmolStr, format_smolstr};
use web_time::{SystemTime, UNIX_EPOCH};

/// Source of millisecond timestamps.
pub trait Clock {
    /// Current time in milliseconds since the unix epoch.
    fn now_ms(&self) -> i64;
}

/// Raw wall clock. Works on native and wasm targets.
///
/// Can step backwards when the system time is corrected; use [`SystemClock`]
/// to stamp changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Never returns less than it returned before, whatever `C` does.
#[derive(Debug)]
pub struct MonotonicClock<C> {
    inner: C,
    last: Cell<i64>,
}

impl<C: Clock> MonotonicClock<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            last: Cell::new(i64::MIN),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Clock + Default> Default for MonotonicClock<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now_ms(&self) -> i64 {
        let now = self.inner.now_ms().max(self.last.get());
        self.last.set(now);
        now
    }
}

/// Wall time clamped so that it never goes backwards.
pub type SystemClock = MonotonicClock<WallClock>;

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.set(now);
    }

    /// Move the clock forward and return the new time.
    pub fn advance(&self, delta: i64) -> i64 {
        let next = self.now.get() + delta;
        self.now.set(next);
        next
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// Source of stable entity ids.
pub trait IdGenerator {
    fn next_id(&self) -> SmolStr;
}

/// Random alphanumeric ids.
#[derive(Debug, Clone, Copy)]
pub struct RandomIdGenerator {
    len: usize,
}

impl RandomIdGenerator {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(12)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> SmolStr {
        rand::rng()
            .sample_iter(rand::distr::Alphanumeric)
            .take(self.len)
            .map(char::from)
            .collect::<String>()
            .into()
    }
}

/// Deterministic `prefix-N` ids, counting from 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: SmolStr,
    counter: Cell<u64>,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<SmolStr>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Cell::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> SmolStr {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        format_smolstr!("{}-{}", self.prefix, next)
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &G {
    fn next_id(&self) -> SmolStr {
        (**self).next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(10);
        assert_eq!(clock.now_ms(), 10);
        assert_eq!(clock.advance(5), 15);
        clock.set(100);
        assert_eq!(clock.now_ms(), 100);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock::default().now_ms() > 1_577_836_800_000);
    }

    #[test]
    fn test_monotonic_clock_holds_through_step_back() {
        let clock = MonotonicClock::new(ManualClock::new(100));
        assert_eq!(clock.now_ms(), 100);
        clock.inner().set(40);
        assert_eq!(clock.now_ms(), 100);
        clock.inner().set(130);
        assert_eq!(clock.now_ms(), 130);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new("aff");
        assert_eq!(ids.next_id(), "aff-1");
        assert_eq!(ids.next_id(), "aff-2");
    }

    #[test]
    fn test_random_ids_length_and_uniqueness() {
        let ids = RandomIdGenerator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
