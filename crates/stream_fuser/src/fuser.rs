//! Multi-stream fusion paced by the accelerometer.

use std::collections::HashMap;

use contracts::{
    ImuConverterConfig, RawSample, Reading, RecordShape, SensorKind, SyncPolicy, TimestampSource,
    UnitRecord,
};
use tracing::{debug, instrument};

use crate::filler::FieldFiller;
use crate::history::StreamHistory;
use crate::interpolate::sample_at;

/// Kinds merged into each accelerometer-paced record
const PAIRED_KINDS: [SensorKind; 3] = [
    SensorKind::Gyroscope,
    SensorKind::RotationVector,
    SensorKind::MagneticField,
];

/// Fused record before stamping
#[derive(Debug, Clone, PartialEq)]
pub struct FusedUnit {
    /// Record with every available slot filled, header still empty
    pub record: UnitRecord,

    /// Accelerometer sample that paced this record
    pub pacing: RawSample,
}

/// Merges independently sampled sub-streams into unit records.
///
/// Stateful across batches: each kind keeps a bounded history, so a sample
/// from an earlier batch can still bracket or be held for a later one.
#[derive(Debug)]
pub struct StreamFuser {
    policy: SyncPolicy,
    shape: RecordShape,
    timestamp_source: TimestampSource,
    history_capacity: usize,
    filler: FieldFiller,
    histories: HashMap<SensorKind, StreamHistory>,
}

impl StreamFuser {
    /// Create a fuser from the IMU converter configuration
    pub fn new(config: &ImuConverterConfig) -> Self {
        let histories = SensorKind::ALL
            .iter()
            .map(|&kind| (kind, StreamHistory::new(config.history_capacity)))
            .collect();

        Self {
            policy: config.sync_policy,
            shape: config.record_shape,
            timestamp_source: config.timestamp_source,
            history_capacity: config.history_capacity,
            filler: FieldFiller::new(config.covariance.clone(), config.enable_rotation),
            histories,
        }
    }

    /// Fuse one batch into records, one per accelerometer sample.
    ///
    /// An empty batch, or a batch without accelerometer samples, yields no
    /// records. Non-pacing samples are still retained in the history.
    #[instrument(
        name = "stream_fuser_fuse",
        level = "debug",
        skip(self, samples),
        fields(samples = samples.len(), policy = ?self.policy)
    )]
    pub fn fuse(&mut self, samples: &[RawSample]) -> Vec<FusedUnit> {
        if samples.is_empty() {
            return Vec::new();
        }
        Self::record_input(samples);

        let units = match self.policy {
            SyncPolicy::Copy => self.fuse_copy(samples),
            SyncPolicy::LinearInterpolate => self.fuse_interpolated(samples),
        };

        debug!(units = units.len(), "batch fused");
        units
    }

    fn fuse_copy(&mut self, samples: &[RawSample]) -> Vec<FusedUnit> {
        let mut units = Vec::new();

        for sample in samples {
            self.history_mut(sample.kind()).push(*sample);

            if sample.kind() == SensorKind::Accelerometer {
                let latest: Vec<Reading> = PAIRED_KINDS
                    .iter()
                    .filter_map(|kind| self.histories.get(kind)?.latest())
                    .map(|s| s.reading)
                    .collect();
                units.push(self.build_unit(sample, latest));
            }
        }

        units
    }

    fn fuse_interpolated(&mut self, samples: &[RawSample]) -> Vec<FusedUnit> {
        let windows: Vec<Vec<RawSample>> = PAIRED_KINDS
            .iter()
            .map(|&kind| self.window(kind, samples))
            .collect();

        let source = self.timestamp_source;
        let units: Vec<FusedUnit> = samples
            .iter()
            .filter(|s| s.kind() == SensorKind::Accelerometer)
            .map(|accel| {
                let t = accel.stamp(source);
                let resampled = windows.iter().filter_map(|w| sample_at(w, t, source));
                self.build_unit(accel, resampled)
            })
            .collect();

        for sample in samples {
            self.history_mut(sample.kind()).push(*sample);
        }

        units
    }

    /// Retained history of `kind` followed by the batch's samples of that kind
    fn window(&self, kind: SensorKind, samples: &[RawSample]) -> Vec<RawSample> {
        let retained = self
            .histories
            .get(&kind)
            .into_iter()
            .flat_map(|h| h.iter().copied());
        let incoming = samples.iter().filter(|s| s.kind() == kind).copied();
        retained.chain(incoming).collect()
    }

    fn build_unit(
        &self,
        pacing: &RawSample,
        others: impl IntoIterator<Item = Reading>,
    ) -> FusedUnit {
        let mut record = UnitRecord::empty(self.shape);
        record.apply(self.filler.slot(&pacing.reading));
        for reading in others {
            record.apply(self.filler.slot(&reading));
        }
        if !self.filler.rotation_enabled() {
            record.apply(FieldFiller::orientation_unreported());
        }

        FusedUnit {
            record,
            pacing: *pacing,
        }
    }

    fn history_mut(&mut self, kind: SensorKind) -> &mut StreamHistory {
        let capacity = self.history_capacity;
        self.histories
            .entry(kind)
            .or_insert_with(|| StreamHistory::new(capacity))
    }

    fn record_input(samples: &[RawSample]) {
        for kind in SensorKind::ALL {
            let count = samples.iter().filter(|s| s.kind() == kind).count();
            observability::record_fused_samples(kind, count);
        }
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn shape(&self) -> RecordShape {
        self.shape
    }

    /// Retained history of one kind
    pub fn history(&self, kind: SensorKind) -> Option<&StreamHistory> {
        self.histories.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        diagonal_covariance, MonotonicTime, Quaternion, Vector3, UNKNOWN_COVARIANCE,
    };

    fn at(t: u64) -> MonotonicTime {
        MonotonicTime::from_nanos(t)
    }

    fn accel(t: u64) -> RawSample {
        RawSample::new(Reading::Accelerometer(Vector3::new(0.0, 0.0, 9.8)), at(t), t)
    }

    fn gyro(t: u64, v: f64) -> RawSample {
        RawSample::new(Reading::Gyroscope(Vector3::new(v, v, v)), at(t), t)
    }

    fn rotation(t: u64, x: f64) -> RawSample {
        RawSample::new(
            Reading::RotationVector {
                orientation: Quaternion::new(x, 0.0, 0.0, 1.0 - x),
                accuracy: 0.01,
            },
            at(t),
            t,
        )
    }

    fn magn(t: u64, v: f64) -> RawSample {
        RawSample::new(Reading::MagneticField(Vector3::new(v, 0.0, 0.0)), at(t), t)
    }

    fn config(policy: SyncPolicy) -> ImuConverterConfig {
        let mut config = ImuConverterConfig::new("imu");
        config.sync_policy = policy;
        config.enable_rotation = true;
        config.covariance.angular_velocity = 0.02;
        config
    }

    fn gyro_x(unit: &FusedUnit) -> f64 {
        unit.record.imu().angular_velocity.expect("angular velocity").value.x
    }

    #[test]
    fn test_empty_batch_yields_nothing() {
        for policy in [SyncPolicy::Copy, SyncPolicy::LinearInterpolate] {
            let mut fuser = StreamFuser::new(&config(policy));
            assert!(fuser.fuse(&[]).is_empty());
        }
    }

    #[test]
    fn test_no_accelerometer_yields_nothing() {
        for policy in [SyncPolicy::Copy, SyncPolicy::LinearInterpolate] {
            let mut fuser = StreamFuser::new(&config(policy));
            let units = fuser.fuse(&[gyro(0, 1.0), magn(1, 2.0), rotation(2, 0.1)]);
            assert!(units.is_empty());
            assert_eq!(fuser.history(SensorKind::Gyroscope).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_copy_accelerometer_only() {
        let mut fuser = StreamFuser::new(&config(SyncPolicy::Copy));
        let units = fuser.fuse(&[accel(0), accel(5), accel(10)]);

        assert_eq!(units.len(), 3);
        for unit in &units {
            let imu = unit.record.imu();
            assert!(imu.linear_acceleration.is_some());
            assert!(imu.angular_velocity.is_none());
            assert!(imu.orientation.is_none());
        }
    }

    #[test]
    fn test_copy_pairs_latest_seen() {
        let mut fuser = StreamFuser::new(&config(SyncPolicy::Copy));
        let units = fuser.fuse(&[
            accel(0),
            gyro(1, 1.0),
            accel(2),
            gyro(3, 3.0),
            gyro(4, 4.0),
            accel(5),
        ]);

        assert_eq!(units.len(), 3);
        assert!(units[0].record.imu().angular_velocity.is_none());
        assert_eq!(gyro_x(&units[1]), 1.0);
        assert_eq!(gyro_x(&units[2]), 4.0);
        assert_eq!(
            units[2].record.imu().angular_velocity.unwrap().covariance,
            diagonal_covariance(0.02)
        );
    }

    #[test]
    fn test_copy_remembers_previous_batch() {
        let mut fuser = StreamFuser::new(&config(SyncPolicy::Copy));
        fuser.fuse(&[gyro(0, 7.0)]);
        let units = fuser.fuse(&[accel(1)]);
        assert_eq!(gyro_x(&units[0]), 7.0);
    }

    #[test]
    fn test_interpolate_between_brackets() {
        let mut fuser = StreamFuser::new(&config(SyncPolicy::LinearInterpolate));
        let units = fuser.fuse(&[gyro(0, 0.0), accel(4), gyro(10, 10.0)]);

        assert_eq!(units.len(), 1);
        assert!((gyro_x(&units[0]) - 4.0).abs() < 1e-9);
        assert_eq!(units[0].pacing.timestamp, at(4));
    }

    #[test]
    fn test_interpolate_holds_boundary() {
        let mut fuser = StreamFuser::new(&config(SyncPolicy::LinearInterpolate));
        let units = fuser.fuse(&[gyro(0, 0.0), gyro(10, 10.0), accel(20)]);
        assert_eq!(gyro_x(&units[0]), 10.0);
    }

    #[test]
    fn test_interpolate_uses_previous_batch_as_bracket() {
        let mut fuser = StreamFuser::new(&config(SyncPolicy::LinearInterpolate));
        fuser.fuse(&[gyro(0, 0.0)]);
        let units = fuser.fuse(&[accel(5), gyro(10, 10.0)]);
        assert!((gyro_x(&units[0]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_omits_unseen_kinds() {
        let mut fuser = StreamFuser::new(&config(SyncPolicy::LinearInterpolate));
        let units = fuser.fuse(&[accel(1), gyro(2, 1.0)]);
        let imu = units[0].record.imu();
        assert!(imu.angular_velocity.is_some());
        assert!(imu.orientation.is_none());
    }

    #[test]
    fn test_interpolate_orientation_componentwise() {
        let mut fuser = StreamFuser::new(&config(SyncPolicy::LinearInterpolate));
        let units = fuser.fuse(&[rotation(0, 0.0), rotation(10, 1.0), accel(5)]);
        let q = units[0].record.imu().orientation.unwrap().value;
        assert!((q.x - 0.5).abs() < 1e-9);
        assert!((q.w - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_disabled_forces_identity() {
        for policy in [SyncPolicy::Copy, SyncPolicy::LinearInterpolate] {
            let mut cfg = config(policy);
            cfg.enable_rotation = false;
            let mut fuser = StreamFuser::new(&cfg);

            let units = fuser.fuse(&[accel(0), rotation(1, 0.3), accel(2)]);
            assert_eq!(units.len(), 2);
            for unit in &units {
                let orientation = unit.record.imu().orientation.unwrap();
                assert_eq!(orientation.value, Quaternion::identity());
                assert_eq!(orientation.covariance, UNKNOWN_COVARIANCE);
            }
        }
    }

    #[test]
    fn test_magnetic_field_only_in_magnetic_shape() {
        let mut cfg = config(SyncPolicy::Copy);
        let mut base = StreamFuser::new(&cfg);
        let units = base.fuse(&[magn(0, 0.5), accel(1)]);
        assert!(units[0].record.magnetic_field().is_none());

        cfg.record_shape = RecordShape::ImuWithMagneticField;
        let mut with_magn = StreamFuser::new(&cfg);
        let units = with_magn.fuse(&[magn(0, 0.5), accel(1)]);
        assert_eq!(units[0].record.magnetic_field().unwrap().value.x, 0.5);
        assert!(units[0].record.imu().angular_velocity.is_none());
    }

    #[test]
    fn test_history_capacity_bounds_retention() {
        let mut cfg = config(SyncPolicy::LinearInterpolate);
        cfg.history_capacity = 2;
        let mut fuser = StreamFuser::new(&cfg);

        fuser.fuse(&[gyro(0, 0.0), gyro(1, 1.0), gyro(2, 2.0), accel(3)]);
        let history = fuser.history(SensorKind::Gyroscope).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.overwritten_count(), 1);
    }
}
