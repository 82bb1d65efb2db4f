//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（配置加载 -> 转换器 -> 记录）

#[cfg(test)]
mod contract_tests {
    use contracts::{RecordShape, UnitRecord, UNKNOWN_COVARIANCE};

    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let record = UnitRecord::empty(RecordShape::ImuWithMagneticField);
        assert_eq!(record.header().seq, 0);
        assert_eq!(UNKNOWN_COVARIANCE[0], -1.0);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::VecDeque;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ImgDetection, ImgDetections, ImuData, ImuPacket, MonotonicTime, Quaternion, RawSample,
        Reading, RecordShape, ReferenceTime, SensorKind, SyncPolicy, UnitRecord, Vector3,
    };
    use converters::{DetectionConverter, ImuConverter};
    use observability::DriftAggregator;
    use stream_fuser::StreamFuser;
    use time_base::ManualClock;

    const REF_START: i64 = 1_700_000_000_000_000_000;
    const MONO_START: u64 = 5_000_000;

    const BRIDGE_TOML: &str = r#"
[time_base]
change_threshold_ns = 100

[imu]
frame_id = "oak_imu_frame"
sync_policy = "linear_interpolate"
record_shape = "imu_with_magnetic_field"
enable_rotation = true

[imu.covariance]
linear_acceleration = 0.01
angular_velocity = 0.02
rotation = 0.03
magnetic_field = 0.04

[detection]
frame_id = "oak_rgb_camera_optical_frame"
width = 400
height = 200
"#;

    fn clock() -> ManualClock {
        ManualClock::new(
            MonotonicTime::from_nanos(MONO_START),
            ReferenceTime::from_nanos(REF_START),
        )
    }

    fn sample(reading: Reading, t: u64) -> RawSample {
        RawSample::new(reading, MonotonicTime::from_nanos(MONO_START + t), t)
    }

    /// 构造一个批次：每 1ms 一个加速度计，陀螺仪/旋转/磁场在相邻时刻报告
    fn batch(start_ms: u64, count: u64) -> ImuData {
        let packets = (start_ms..start_ms + count)
            .map(|i| {
                let t = i * 1_000_000;
                let v = i as f64;
                ImuPacket {
                    accelerometer: Some(sample(
                        Reading::Accelerometer(Vector3::new(0.0, 0.0, 9.8)),
                        t,
                    )),
                    gyroscope: Some(sample(Reading::Gyroscope(Vector3::new(v, 0.0, 0.0)), t)),
                    rotation_vector: Some(sample(
                        Reading::RotationVector {
                            orientation: Quaternion::identity(),
                            accuracy: 0.1,
                        },
                        t,
                    )),
                    magnetic_field: Some(sample(
                        Reading::MagneticField(Vector3::new(0.0, v, 0.0)),
                        t,
                    )),
                }
            })
            .collect();
        ImuData { packets }
    }

    /// End-to-end test: config -> ImuConverter -> UnitRecord
    #[test]
    fn test_e2e_imu_pipeline() {
        let config = ConfigLoader::load_from_str(BRIDGE_TOML, ConfigFormat::Toml).unwrap();
        let imu_config = config.imu.clone().unwrap();
        let mut converter =
            ImuConverter::with_clock(imu_config, &config.time_base, clock()).unwrap();

        let mut out = VecDeque::new();
        let appended = converter.to_records(&batch(0, 5).samples(), &mut out);
        assert_eq!(appended, 5);

        for (i, record) in out.iter().enumerate() {
            assert_eq!(record.shape(), RecordShape::ImuWithMagneticField);
            assert_eq!(record.header().frame_id, "oak_imu_frame");
            assert_eq!(record.header().seq, i as u64);
            assert_eq!(
                record.header().stamp.as_nanos(),
                REF_START + i as i64 * 1_000_000
            );

            let imu = record.imu();
            let gyro = imu.angular_velocity.unwrap();
            assert_eq!(gyro.value.x, i as f64);
            assert_eq!(gyro.covariance[0], 0.02);
            assert_eq!(imu.linear_acceleration.unwrap().covariance[4], 0.01);
            assert_eq!(imu.orientation.unwrap().covariance[8], 0.03);

            let magn = record.magnetic_field().unwrap();
            assert_eq!(magn.value.y, i as f64);
            assert_eq!(magn.covariance[0], 0.04);
        }
    }

    /// 跨批次：历史保留，时钟跳变后 rebase 只影响后续记录
    #[test]
    fn test_e2e_rebase_between_batches() {
        let config = ConfigLoader::load_from_str(BRIDGE_TOML, ConfigFormat::Toml).unwrap();
        let clock = clock();
        let mut converter =
            ImuConverter::with_clock(config.imu.unwrap(), &config.time_base, clock.clone())
                .unwrap();
        let mut drift = DriftAggregator::new();

        let mut out = VecDeque::new();
        converter.to_records(&batch(0, 3).samples(), &mut out);
        let before: Vec<i64> = out.iter().map(|r| r.header().stamp.as_nanos()).collect();

        clock.advance(Duration::from_millis(3));
        drift.update(&converter.rebase());

        clock.step_reference(2_000_000);
        drift.update(&converter.rebase());

        converter.to_records(&batch(3, 2).samples(), &mut out);
        assert_eq!(out.len(), 5);

        let after: Vec<i64> = out.iter().map(|r| r.header().stamp.as_nanos()).collect();
        assert_eq!(&after[..3], &before[..]);
        assert_eq!(after[3], REF_START + 3_000_000 + 2_000_000);
        assert_eq!(after[4], REF_START + 4_000_000 + 2_000_000);

        let summary = drift.summary();
        assert_eq!(summary.total_rebases, 2);
        assert_eq!(summary.significant_changes, 1);
        assert_eq!(summary.total_change_ns, 2_000_000);
        assert_eq!(converter.time_base().drift().total_change_ns(), 2_000_000);
    }

    /// Copy 策略：按到达顺序配对最近一次的陀螺仪报告，不做插值
    #[test]
    fn test_e2e_copy_policy_pairs_latest_arrival() {
        let config = ConfigLoader::load_from_str(BRIDGE_TOML, ConfigFormat::Toml).unwrap();
        let mut imu_config = config.imu.unwrap();
        imu_config.sync_policy = SyncPolicy::Copy;

        let accel = |t| sample(Reading::Accelerometer(Vector3::new(0.0, 0.0, 9.8)), t);
        let gyro = |t, v| sample(Reading::Gyroscope(Vector3::new(v, 0.0, 0.0)), t);
        let data = ImuData {
            packets: vec![
                ImuPacket {
                    gyroscope: Some(gyro(0, 1.0)),
                    ..Default::default()
                },
                ImuPacket {
                    accelerometer: Some(accel(1_000_000)),
                    gyroscope: Some(gyro(2_000_000, 2.0)),
                    ..Default::default()
                },
                ImuPacket {
                    accelerometer: Some(accel(3_000_000)),
                    ..Default::default()
                },
            ],
        };
        let samples = data.samples();

        let mut fuser = StreamFuser::new(&imu_config);
        let units = fuser.fuse(&samples);
        let pacing: Vec<u64> = units.iter().map(|u| u.pacing.sequence).collect();
        assert_eq!(pacing, vec![1_000_000, 3_000_000]);
        assert_eq!(fuser.history(SensorKind::Gyroscope).unwrap().len(), 2);

        let mut converter =
            ImuConverter::with_clock(imu_config, &config.time_base, clock()).unwrap();
        let mut out = VecDeque::new();
        assert_eq!(converter.to_records(&samples, &mut out), 2);

        for (record, offset) in out.iter().zip([1_000_000i64, 3_000_000]) {
            assert_eq!(record.header().stamp.as_nanos(), REF_START + offset);
            assert_eq!(record.imu().angular_velocity.unwrap().value.x, 2.0);
            assert!(record.imu().orientation.is_none());
            assert!(record.magnetic_field().is_none());
        }
    }

    #[test]
    fn test_e2e_single_record_mode() {
        let config = ConfigLoader::load_from_str(BRIDGE_TOML, ConfigFormat::Toml).unwrap();
        let mut converter =
            ImuConverter::with_clock(config.imu.unwrap(), &config.time_base, clock()).unwrap();

        let record: Box<UnitRecord> = converter.to_record(&batch(0, 4).samples()).unwrap();
        assert_eq!(record.header().stamp.as_nanos(), REF_START);
        assert_eq!(converter.emitted_count(), 1);
    }

    /// End-to-end test: config -> DetectionConverter -> Detection2DArray
    #[test]
    fn test_e2e_detection_pipeline() {
        let config = ConfigLoader::load_from_str(BRIDGE_TOML, ConfigFormat::Toml).unwrap();
        let mut converter = DetectionConverter::with_clock(
            config.detection.unwrap(),
            &config.time_base,
            clock(),
        )
        .unwrap();

        let input = ImgDetections {
            detections: vec![ImgDetection {
                label: 15,
                confidence: 0.5,
                xmin: 0.25,
                ymin: 0.5,
                xmax: 0.75,
                ymax: 1.0,
            }],
            timestamp: MonotonicTime::from_nanos(MONO_START + 42),
            timestamp_device: MonotonicTime::from_nanos(1),
            sequence: 7,
        };

        let mut out = VecDeque::new();
        converter.to_records(&input, &mut out);
        assert_eq!(out.len(), 1);

        let array = &out[0];
        assert_eq!(array.header.frame_id, "oak_rgb_camera_optical_frame");
        assert_eq!(array.header.stamp.as_nanos(), REF_START + 42);
        assert_eq!(array.detections.len(), 1);

        let det = &array.detections[0];
        assert_eq!(det.results[0].id, "15");
        assert_eq!(det.results[0].score, 0.5);
        assert_eq!(det.bbox.center_x, 200.0);
        assert_eq!(det.bbox.center_y, 150.0);
        assert_eq!(det.bbox.size_x, 200.0);
        assert_eq!(det.bbox.size_y, 100.0);
    }
}
