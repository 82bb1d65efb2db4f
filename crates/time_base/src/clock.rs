//! Clock sources read by the time base.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use contracts::{MonotonicTime, ReferenceTime};

/// Pair of clocks the time base reconciles.
pub trait ClockSource {
    /// Current instant on the steady monotonic clock
    fn monotonic_now(&self) -> MonotonicTime;

    /// Current instant on the external reference clock
    fn reference_now(&self) -> ReferenceTime;
}

static MONOTONIC_ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Current instant of the process-wide monotonic clock.
///
/// A source feed stamping samples in-process must use this function so that
/// its timestamps share the domain read by [`SystemClock`].
pub fn monotonic_now() -> MonotonicTime {
    let origin = MONOTONIC_ORIGIN.get_or_init(Instant::now);
    MonotonicTime::from_duration(origin.elapsed())
}

/// Host clocks: `Instant` for the monotonic domain, `SystemTime` for the reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn monotonic_now(&self) -> MonotonicTime {
        monotonic_now()
    }

    fn reference_now(&self) -> ReferenceTime {
        let nanos = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => duration_to_i64(since),
            Err(before) => -duration_to_i64(before.duration()),
        };
        ReferenceTime::from_nanos(nanos)
    }
}

fn duration_to_i64(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

/// Manually driven clocks for tests and replay.
///
/// Clones share state, so a test can keep one handle and hand another to a
/// time base.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    monotonic_ns: Arc<AtomicU64>,
    reference_ns: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(monotonic: MonotonicTime, reference: ReferenceTime) -> Self {
        Self {
            monotonic_ns: Arc::new(AtomicU64::new(monotonic.as_nanos())),
            reference_ns: Arc::new(AtomicI64::new(reference.as_nanos())),
        }
    }

    /// Advance both clocks by the same amount.
    pub fn advance(&self, by: Duration) {
        let nanos = duration_to_i64(by);
        self.monotonic_ns.fetch_add(nanos as u64, Ordering::SeqCst);
        self.reference_ns.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Step only the reference clock (NTP step, manual set).
    pub fn step_reference(&self, nanos: i64) {
        self.reference_ns.fetch_add(nanos, Ordering::SeqCst);
    }

    pub fn set_monotonic(&self, t: MonotonicTime) {
        self.monotonic_ns.store(t.as_nanos(), Ordering::SeqCst);
    }

    pub fn set_reference(&self, t: ReferenceTime) {
        self.reference_ns.store(t.as_nanos(), Ordering::SeqCst);
    }
}

impl ClockSource for ManualClock {
    fn monotonic_now(&self) -> MonotonicTime {
        MonotonicTime::from_nanos(self.monotonic_ns.load(Ordering::SeqCst))
    }

    fn reference_now(&self) -> ReferenceTime {
        ReferenceTime::from_nanos(self.reference_ns.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_now_never_decreases() {
        let a = monotonic_now();
        let b = monotonic_now();
        assert!(b >= a);
    }

    #[test]
    fn test_system_reference_after_epoch() {
        assert!(SystemClock.reference_now().sec() > 1_600_000_000);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(MonotonicTime::from_nanos(10), ReferenceTime::from_nanos(1_000));
        let handle = clock.clone();

        handle.advance(Duration::from_nanos(5));
        handle.step_reference(-200);

        assert_eq!(clock.monotonic_now().as_nanos(), 15);
        assert_eq!(clock.reference_now().as_nanos(), 805);
    }
}
