//! IMU batch to unit record conversion.

use std::collections::VecDeque;

use contracts::{
    ContractError, ImuConverterConfig, RawSample, RebaseEvent, SyncPolicy, TimeBaseConfig,
    UnitRecord,
};
use stream_fuser::{FusedUnit, StreamFuser};
use time_base::{ClockSource, SystemClock, TimeBase};
use tracing::{instrument, trace};
use validator::Validate;

const CONVERTER_NAME: &str = "imu";

/// Converts IMU sample batches into stamped unit records.
///
/// Owns the time base of the IMU clock and the stream fuser state.
#[derive(Debug)]
pub struct ImuConverter<C = SystemClock> {
    config: ImuConverterConfig,
    time_base: TimeBase<C>,
    fuser: StreamFuser,
    sequence: u64,
}

impl ImuConverter<SystemClock> {
    /// Create a converter over the host clocks
    ///
    /// # Errors
    /// Returns a validation error if the configuration is invalid
    pub fn new(
        config: ImuConverterConfig,
        time_base: &TimeBaseConfig,
    ) -> Result<Self, ContractError> {
        Self::with_clock(config, time_base, SystemClock)
    }
}

impl<C: ClockSource> ImuConverter<C> {
    /// Create a converter reading the given clocks
    ///
    /// # Errors
    /// Returns a validation error if the configuration is invalid
    pub fn with_clock(
        config: ImuConverterConfig,
        time_base: &TimeBaseConfig,
        clock: C,
    ) -> Result<Self, ContractError> {
        config
            .validate()
            .map_err(|e| ContractError::from_validation("imu", &e))?;

        Ok(Self {
            fuser: StreamFuser::new(&config),
            time_base: TimeBase::with_clock(clock, time_base),
            config,
            sequence: 0,
        })
    }

    /// Fuse a batch and append the stamped records to `out`.
    ///
    /// Existing contents of `out` are left untouched. Returns the number of
    /// records appended.
    #[instrument(
        name = "imu_converter_to_records",
        level = "debug",
        skip(self, samples, out),
        fields(samples = samples.len())
    )]
    pub fn to_records(&mut self, samples: &[RawSample], out: &mut VecDeque<UnitRecord>) -> usize {
        let units = self.fuser.fuse(samples);
        let count = units.len();

        for unit in units {
            let record = self.stamp(unit);
            out.push_back(record);
        }

        observability::record_records_emitted(CONVERTER_NAME, count);
        count
    }

    /// Fuse a batch and return only its first record.
    ///
    /// Any further records produced by the batch are discarded.
    #[instrument(
        name = "imu_converter_to_record",
        level = "debug",
        skip(self, samples),
        fields(samples = samples.len())
    )]
    pub fn to_record(&mut self, samples: &[RawSample]) -> Option<Box<UnitRecord>> {
        let mut units = self.fuser.fuse(samples).into_iter();
        let first = units.next()?;

        let discarded = units.count();
        if discarded > 0 {
            trace!(discarded, "single record conversion discarded records");
            observability::record_records_discarded(CONVERTER_NAME, discarded);
        }

        let record = self.stamp(first);
        observability::record_records_emitted(CONVERTER_NAME, 1);
        Some(Box::new(record))
    }

    fn stamp(&mut self, unit: FusedUnit) -> UnitRecord {
        let FusedUnit { mut record, pacing } = unit;
        let stamp = self
            .time_base
            .translate(pacing.stamp(self.config.timestamp_source));

        let header = record.header_mut();
        header.frame_id.clone_from(&self.config.frame_id);
        header.stamp = stamp;
        header.seq = self.sequence;
        self.sequence += 1;

        record
    }

    /// Absorb a reference clock discontinuity
    pub fn rebase(&mut self) -> RebaseEvent {
        self.time_base.rebase()
    }

    pub fn time_base(&self) -> &TimeBase<C> {
        &self.time_base
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        self.fuser.policy()
    }

    pub fn config(&self) -> &ImuConverterConfig {
        &self.config
    }

    /// Number of records emitted so far
    pub fn emitted_count(&self) -> u64 {
        self.sequence
    }
}
