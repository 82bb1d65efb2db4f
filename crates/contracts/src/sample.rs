//! RawSample - source feed input
//!
//! Readings produced by the device driver, one per physical sub-sensor report.

use serde::{Deserialize, Serialize};

use crate::{MonotonicTime, TimestampSource};

/// Physical sub-sensor a reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    /// Orientation quaternion with heading accuracy
    RotationVector,
    MagneticField,
}

impl SensorKind {
    /// All kinds, pacing stream first.
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Accelerometer,
        SensorKind::Gyroscope,
        SensorKind::RotationVector,
        SensorKind::MagneticField,
    ];

    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::RotationVector => "rotation_vector",
            SensorKind::MagneticField => "magnetic_field",
        }
    }
}

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Orientation quaternion (`w` is the real part)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// No rotation
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// Reading value, tagged by sensor kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    /// Linear acceleration (m/s²)
    Accelerometer(Vector3),

    /// Angular velocity (rad/s)
    Gyroscope(Vector3),

    /// Orientation with estimated heading accuracy (rad)
    RotationVector { orientation: Quaternion, accuracy: f64 },

    /// Magnetic field (T)
    MagneticField(Vector3),
}

impl Reading {
    pub fn kind(&self) -> SensorKind {
        match self {
            Reading::Accelerometer(_) => SensorKind::Accelerometer,
            Reading::Gyroscope(_) => SensorKind::Gyroscope,
            Reading::RotationVector { .. } => SensorKind::RotationVector,
            Reading::MagneticField(_) => SensorKind::MagneticField,
        }
    }
}

/// One reading from a physical sub-sensor.
///
/// Within one kind, timestamps are expected to be non-decreasing. The source
/// feed is trusted; out-of-order input yields unspecified fusion output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Reading value
    pub reading: Reading,

    /// Capture time on the host-synchronised monotonic clock
    pub timestamp: MonotonicTime,

    /// Capture time on the device's own monotonic clock
    pub timestamp_device: MonotonicTime,

    /// Per-kind sequence number assigned by the device
    pub sequence: u64,
}

impl RawSample {
    /// Sample stamped identically in both clock domains.
    pub fn new(reading: Reading, timestamp: MonotonicTime, sequence: u64) -> Self {
        Self {
            reading,
            timestamp,
            timestamp_device: timestamp,
            sequence,
        }
    }

    #[inline]
    pub fn kind(&self) -> SensorKind {
        self.reading.kind()
    }

    /// Timestamp in the selected clock domain.
    #[inline]
    pub fn stamp(&self, source: TimestampSource) -> MonotonicTime {
        match source {
            TimestampSource::Host => self.timestamp,
            TimestampSource::Device => self.timestamp_device,
        }
    }
}

/// Reports delivered together by the driver
///
/// Each slot holds at most one report; slots are expected to hold readings of
/// their own kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuPacket {
    pub accelerometer: Option<RawSample>,
    pub gyroscope: Option<RawSample>,
    pub rotation_vector: Option<RawSample>,
    pub magnetic_field: Option<RawSample>,
}

/// One batch from the source feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuData {
    pub packets: Vec<ImuPacket>,
}

impl ImuData {
    /// Flatten packets into arrival order.
    ///
    /// Within a packet the accelerometer report is placed last so that it is
    /// paired with the reports delivered alongside it.
    pub fn samples(&self) -> Vec<RawSample> {
        self.packets
            .iter()
            .flat_map(|p| {
                [
                    p.gyroscope,
                    p.rotation_vector,
                    p.magnetic_field,
                    p.accelerometer,
                ]
            })
            .flatten()
            .collect()
    }
}
