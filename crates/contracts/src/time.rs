//! Clock domain types.
//!
//! Two clock domains are involved in every conversion:
//! - `MonotonicTime`: steady clock used by the driver to stamp samples
//! - `ReferenceTime`: external wall clock presented to bus consumers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Instant on a steady monotonic clock (nanoseconds since the clock's origin).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonotonicTime {
    nanos: u64,
}

impl MonotonicTime {
    /// Create from nanoseconds since the clock origin.
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Create from a duration since the clock origin.
    #[inline]
    pub fn from_duration(since_origin: Duration) -> Self {
        Self {
            nanos: u64::try_from(since_origin.as_nanos()).unwrap_or(u64::MAX),
        }
    }

    /// Create from seconds (floating point). Negative input clamps to zero.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            nanos: (secs * 1e9).max(0.0) as u64,
        }
    }

    /// Nanoseconds since the clock origin.
    #[inline]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// Seconds since the clock origin.
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// Signed distance `self - earlier` in nanoseconds, saturating at the `i64` range.
    #[inline]
    pub fn nanos_since(self, earlier: MonotonicTime) -> i64 {
        let diff = i128::from(self.nanos) - i128::from(earlier.nanos);
        i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
    }
}

impl Add<Duration> for MonotonicTime {
    type Output = MonotonicTime;

    fn add(self, rhs: Duration) -> Self::Output {
        MonotonicTime::from_nanos(self.nanos.saturating_add(rhs.as_nanos() as u64))
    }
}

impl Sub<Duration> for MonotonicTime {
    type Output = MonotonicTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        MonotonicTime::from_nanos(self.nanos.saturating_sub(rhs.as_nanos() as u64))
    }
}

/// Instant on the external reference (wall) clock, nanoseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReferenceTime {
    nanos: i64,
}

impl ReferenceTime {
    /// Create from nanoseconds since the UNIX epoch.
    #[inline]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    /// Nanoseconds since the UNIX epoch.
    #[inline]
    pub const fn as_nanos(self) -> i64 {
        self.nanos
    }

    /// Whole seconds part of a `sec`/`nanosec` header stamp.
    #[inline]
    pub const fn sec(self) -> i64 {
        self.nanos.div_euclid(NANOS_PER_SEC)
    }

    /// Sub-second part of a `sec`/`nanosec` header stamp.
    #[inline]
    pub const fn nanosec(self) -> u32 {
        self.nanos.rem_euclid(NANOS_PER_SEC) as u32
    }

    /// Seconds since the UNIX epoch (floating point).
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// Shift by a signed number of nanoseconds.
    #[inline]
    pub const fn offset_by(self, nanos: i64) -> Self {
        Self {
            nanos: self.nanos.saturating_add(nanos),
        }
    }
}

impl fmt::Display for ReferenceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.sec(), self.nanosec())
    }
}

/// Outcome of one time base rebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebaseEvent {
    /// Change of the reference anchor caused by this rebase (ns)
    pub diff_ns: i64,

    /// Sum of every diff observed since construction (ns)
    pub total_change_ns: i64,

    /// Reference anchor after the rebase
    pub reference_anchor: ReferenceTime,

    /// Whether |diff| exceeded the change threshold
    pub significant: bool,
}
