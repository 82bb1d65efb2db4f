//! Temporal interpolation of readings.

use contracts::{MonotonicTime, Quaternion, RawSample, Reading, TimestampSource, Vector3};

/// Component-wise linear blend
pub trait Lerp: Sized {
    /// `self` at `alpha = 0`, `other` at `alpha = 1`
    fn lerp(&self, other: &Self, alpha: f64) -> Self;
}

#[inline]
fn blend(a: f64, b: f64, alpha: f64) -> f64 {
    alpha.mul_add(b - a, a)
}

impl Lerp for Vector3 {
    fn lerp(&self, other: &Self, alpha: f64) -> Self {
        Vector3 {
            x: blend(self.x, other.x, alpha),
            y: blend(self.y, other.y, alpha),
            z: blend(self.z, other.z, alpha),
        }
    }
}

/// Per-component blend, not slerp, and the result is not renormalised.
/// Only a fair approximation for small angular steps between samples.
impl Lerp for Quaternion {
    fn lerp(&self, other: &Self, alpha: f64) -> Self {
        Quaternion {
            x: blend(self.x, other.x, alpha),
            y: blend(self.y, other.y, alpha),
            z: blend(self.z, other.z, alpha),
            w: blend(self.w, other.w, alpha),
        }
    }
}

impl Lerp for Reading {
    /// Readings of different kinds do not blend; `self` is returned unchanged.
    fn lerp(&self, other: &Self, alpha: f64) -> Self {
        match (self, other) {
            (Reading::Accelerometer(a), Reading::Accelerometer(b)) => {
                Reading::Accelerometer(a.lerp(b, alpha))
            }
            (Reading::Gyroscope(a), Reading::Gyroscope(b)) => Reading::Gyroscope(a.lerp(b, alpha)),
            (
                Reading::RotationVector {
                    orientation: qa,
                    accuracy: aa,
                },
                Reading::RotationVector {
                    orientation: qb,
                    accuracy: ab,
                },
            ) => Reading::RotationVector {
                orientation: qa.lerp(qb, alpha),
                accuracy: blend(*aa, *ab, alpha),
            },
            (Reading::MagneticField(a), Reading::MagneticField(b)) => {
                Reading::MagneticField(a.lerp(b, alpha))
            }
            _ => *self,
        }
    }
}

/// Reading of a time-ordered window resampled at `t`.
///
/// Between two bracketing samples the value is blended linearly. Before the
/// first or after the last sample the boundary value is held. `None` when
/// the window is empty.
pub fn sample_at(window: &[RawSample], t: MonotonicTime, source: TimestampSource) -> Option<Reading> {
    let after_idx = window.partition_point(|s| s.stamp(source) <= t);
    let before = after_idx.checked_sub(1).and_then(|i| window.get(i));
    let after = window.get(after_idx);

    match (before, after) {
        (Some(before), Some(after)) => {
            let t0 = before.stamp(source);
            let span = after.stamp(source).nanos_since(t0);
            if span <= 0 {
                return Some(before.reading);
            }
            let alpha = t.nanos_since(t0) as f64 / span as f64;
            Some(before.reading.lerp(&after.reading, alpha))
        }
        (Some(held), None) | (None, Some(held)) => Some(held.reading),
        (None, None) => None,
    }
}
