//! Per-kind sample history with bounded depth.
//!
//! Samples of one kind arrive in timestamp order, so the ring buffer is
//! also time ordered: oldest at the head, newest at the tail.

use std::fmt;

use contracts::RawSample;
use ringbuf::{traits::*, HeapRb};

/// Bounded history of one sensor kind, carried across batches
pub struct StreamHistory {
    samples: HeapRb<RawSample>,
    latest: Option<RawSample>,
    overwritten: u64,
}

impl fmt::Debug for StreamHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHistory")
            .field("len", &self.samples.occupied_len())
            .field("capacity", &self.samples.capacity())
            .field("overwritten", &self.overwritten)
            .finish()
    }
}

impl StreamHistory {
    /// Create a history keeping at most `capacity` samples
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: HeapRb::new(capacity.max(1)),
            latest: None,
            overwritten: 0,
        }
    }

    /// Append a sample, overwriting the oldest one when full
    #[inline]
    pub fn push(&mut self, sample: RawSample) {
        if self.samples.is_full() {
            self.overwritten += 1;
        }
        self.samples.push_overwrite(sample);
        self.latest = Some(sample);
    }

    /// Most recently pushed sample
    #[inline]
    pub fn latest(&self) -> Option<&RawSample> {
        self.latest.as_ref()
    }

    /// Samples oldest first
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &RawSample> + '_ {
        self.samples.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples dropped because the history was full
    #[inline]
    pub fn overwritten_count(&self) -> u64 {
        self.overwritten
    }
}
