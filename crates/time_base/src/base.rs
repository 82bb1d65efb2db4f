//! Monotonic to reference clock mapping.

use contracts::{MonotonicTime, RebaseEvent, ReferenceTime, TimeBaseConfig};
use tracing::{debug, instrument, trace};

use crate::clock::{ClockSource, SystemClock};

/// Instant pair tying the monotonic clock to the reference clock.
///
/// `reference` is the reference-clock reading corresponding to `monotonic`
/// as of the last rebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockAnchor {
    pub monotonic: MonotonicTime,
    pub reference: ReferenceTime,
}

/// Running sum of reference anchor changes, for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriftLedger {
    total_change_ns: i64,
}

impl DriftLedger {
    /// Accumulate one rebase diff and return the new total.
    pub fn record(&mut self, diff_ns: i64) -> i64 {
        self.total_change_ns = self.total_change_ns.saturating_add(diff_ns);
        self.total_change_ns
    }

    pub fn total_change_ns(&self) -> i64 {
        self.total_change_ns
    }
}

/// Maps device monotonic instants onto the external reference clock.
///
/// One instance per physical clock. There is no internal locking: callers
/// sharing an instance must serialise `rebase` against `translate`.
#[derive(Debug)]
pub struct TimeBase<C = SystemClock> {
    clock: C,
    anchor: ClockAnchor,
    ledger: DriftLedger,
    change_threshold_ns: i64,
}

impl TimeBase<SystemClock> {
    /// Time base over the host clocks.
    pub fn new(config: &TimeBaseConfig) -> Self {
        Self::with_clock(SystemClock, config)
    }
}

impl<C: ClockSource> TimeBase<C> {
    /// Time base over the given clocks, anchored at their current readings.
    pub fn with_clock(clock: C, config: &TimeBaseConfig) -> Self {
        let anchor = Self::capture(&clock);
        trace!(
            monotonic_ns = anchor.monotonic.as_nanos(),
            reference = %anchor.reference,
            "time base initialized"
        );
        Self {
            clock,
            anchor,
            ledger: DriftLedger::default(),
            change_threshold_ns: config.change_threshold_ns,
        }
    }

    fn capture(clock: &C) -> ClockAnchor {
        let reference = clock.reference_now();
        let monotonic = clock.monotonic_now();
        ClockAnchor {
            monotonic,
            reference,
        }
    }

    /// Re-synchronise the reference anchor with the reference clock.
    ///
    /// The monotonic anchor is kept; only the reference anchor moves. Safe to
    /// call at any cadence.
    #[instrument(name = "time_base_rebase", level = "trace", skip(self))]
    pub fn rebase(&mut self) -> RebaseEvent {
        let now = Self::capture(&self.clock);
        let expected_offset = now.monotonic.nanos_since(self.anchor.monotonic);
        let candidate = now.reference.offset_by(expected_offset.saturating_neg());

        let diff_ns = candidate
            .as_nanos()
            .saturating_sub(self.anchor.reference.as_nanos());
        let total_change_ns = self.ledger.record(diff_ns);
        let significant =
            diff_ns.unsigned_abs() > self.change_threshold_ns.max(0).unsigned_abs();

        self.anchor.reference = candidate;

        let event = RebaseEvent {
            diff_ns,
            total_change_ns,
            reference_anchor: candidate,
            significant,
        };

        if significant {
            debug!(
                diff_ns,
                total_change_ns,
                reference_anchor = %candidate,
                "reference base time changed"
            );
        }
        observability::record_rebase(&event);

        event
    }

    /// Reference instant for a monotonic instant, using the current anchor.
    #[inline]
    pub fn translate(&self, monotonic: MonotonicTime) -> ReferenceTime {
        self.anchor
            .reference
            .offset_by(monotonic.nanos_since(self.anchor.monotonic))
    }

    pub fn anchor(&self) -> ClockAnchor {
        self.anchor
    }

    pub fn drift(&self) -> DriftLedger {
        self.ledger
    }

    pub fn change_threshold_ns(&self) -> i64 {
        self.change_threshold_ns
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
