//! Cancellable debounce timer over an injectable clock.
//!
//! Nothing here sleeps. Drivers ask [`Debouncer::remaining`] how long to wait
//! and then call [`Debouncer::take_due`]; tests drive a [`ManualClock`]
//! instead of waiting on the wall clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Identifies one scheduled firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<T> {
    id: TimerId,
    due: Duration,
    payload: T,
}

/// Holds at most one pending payload; scheduling again supersedes it.
#[derive(Debug)]
pub struct Debouncer<T, C = SystemClock> {
    delay: Duration,
    clock: C,
    pending: Option<Pending<T>>,
    next_id: u64,
}

impl<T, C: Clock> Debouncer<T, C> {
    pub fn new(delay: Duration, clock: C) -> Self {
        Self {
            delay,
            clock,
            pending: None,
            next_id: 0,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Schedule `payload` to fire after the delay, cancelling anything pending.
    pub fn schedule(&mut self, payload: T) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending = Some(Pending {
            id,
            due: self.clock.now() + self.delay,
            payload,
        });
        id
    }

    /// Cancel the pending firing, handing back its payload.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_id(&self) -> Option<TimerId> {
        self.pending.as_ref().map(|p| p.id)
    }

    /// Time left before the pending payload is due; zero once overdue.
    pub fn remaining(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.pending.as_ref().map(|p| p.due.saturating_sub(now))
    }

    /// Take the payload if its deadline has passed.
    pub fn take_due(&mut self) -> Option<T> {
        let now = self.clock.now();
        match &self.pending {
            Some(p) if p.due <= now => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_fires_after_delay() {
        let clock = ManualClock::new();
        let mut timer = Debouncer::new(DELAY, clock.clone());
        timer.schedule("tofu");

        clock.advance(Duration::from_millis(299));
        assert_eq!(timer.take_due(), None);
        assert_eq!(timer.remaining(), Some(Duration::from_millis(1)));

        clock.advance(Duration::from_millis(1));
        assert_eq!(timer.take_due(), Some("tofu"));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_reschedule_supersedes() {
        let clock = ManualClock::new();
        let mut timer = Debouncer::new(DELAY, clock.clone());

        let first = timer.schedule("t");
        clock.advance(Duration::from_millis(200));
        let second = timer.schedule("to");
        assert_ne!(first, second);
        assert_eq!(timer.pending_id(), Some(second));

        clock.advance(Duration::from_millis(200));
        assert_eq!(timer.take_due(), None);

        clock.advance(Duration::from_millis(100));
        assert_eq!(timer.take_due(), Some("to"));
    }

    #[test]
    fn test_cancel() {
        let clock = ManualClock::new();
        let mut timer = Debouncer::new(DELAY, clock.clone());
        timer.schedule(1);
        assert_eq!(timer.cancel(), Some(1));

        clock.advance(DELAY);
        assert_eq!(timer.take_due(), None);
        assert_eq!(timer.remaining(), None);
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
