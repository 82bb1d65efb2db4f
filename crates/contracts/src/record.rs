//! UnitRecord - converter output
//!
//! Fused, stamped IMU records handed to the sink format.

use serde::{Deserialize, Serialize};

use crate::{Quaternion, ReferenceTime, Vector3};

/// Row-major 3×3 covariance
pub type Covariance = [f64; 9];

/// Covariance marking a field as intentionally not reported
pub const UNKNOWN_COVARIANCE: Covariance = [-1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0];

/// Diagonal covariance with the same variance on every axis
pub fn diagonal_covariance(variance: f64) -> Covariance {
    [
        variance, 0.0, 0.0, //
        0.0, variance, 0.0, //
        0.0, 0.0, variance,
    ]
}

/// Message header shared by every output record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Coordinate frame, copied verbatim from configuration
    pub frame_id: String,

    /// Reference clock stamp
    pub stamp: ReferenceTime,

    /// Per-converter emission counter
    pub seq: u64,
}

/// Value together with its covariance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measured<T> {
    pub value: T,
    pub covariance: Covariance,
}

impl<T> Measured<T> {
    pub fn new(value: T, covariance: Covariance) -> Self {
        Self { value, covariance }
    }
}

/// Populated field of a unit record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldSlot {
    LinearAcceleration(Measured<Vector3>),
    AngularVelocity(Measured<Vector3>),
    Orientation(Measured<Quaternion>),
    MagneticField(Measured<Vector3>),
}

/// Base IMU record
///
/// `None` means no reading of that kind was available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuRecord {
    pub header: Header,
    pub orientation: Option<Measured<Quaternion>>,
    pub angular_velocity: Option<Measured<Vector3>>,
    pub linear_acceleration: Option<Measured<Vector3>>,
}

/// IMU record with an additional magnetic field slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuWithMagneticFieldRecord {
    pub imu: ImuRecord,
    pub magnetic_field: Option<Measured<Vector3>>,
}

/// Output record shape requested by the consumer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordShape {
    #[default]
    Imu,
    ImuWithMagneticField,
}

/// Fused output unit, tagged by the slots it can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRecord {
    Imu(ImuRecord),
    ImuWithMagneticField(ImuWithMagneticFieldRecord),
}

impl UnitRecord {
    /// Empty record of the given shape
    pub fn empty(shape: RecordShape) -> Self {
        match shape {
            RecordShape::Imu => UnitRecord::Imu(ImuRecord::default()),
            RecordShape::ImuWithMagneticField => {
                UnitRecord::ImuWithMagneticField(ImuWithMagneticFieldRecord::default())
            }
        }
    }

    pub fn shape(&self) -> RecordShape {
        match self {
            UnitRecord::Imu(_) => RecordShape::Imu,
            UnitRecord::ImuWithMagneticField(_) => RecordShape::ImuWithMagneticField,
        }
    }

    pub fn imu(&self) -> &ImuRecord {
        match self {
            UnitRecord::Imu(imu) => imu,
            UnitRecord::ImuWithMagneticField(rec) => &rec.imu,
        }
    }

    pub fn imu_mut(&mut self) -> &mut ImuRecord {
        match self {
            UnitRecord::Imu(imu) => imu,
            UnitRecord::ImuWithMagneticField(rec) => &mut rec.imu,
        }
    }

    pub fn header(&self) -> &Header {
        &self.imu().header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.imu_mut().header
    }

    /// Magnetic field, if this shape carries one and it was filled
    pub fn magnetic_field(&self) -> Option<&Measured<Vector3>> {
        match self {
            UnitRecord::Imu(_) => None,
            UnitRecord::ImuWithMagneticField(rec) => rec.magnetic_field.as_ref(),
        }
    }

    /// Store a slot. Returns `false` when this shape has no room for it.
    pub fn apply(&mut self, slot: FieldSlot) -> bool {
        match (self, slot) {
            (UnitRecord::ImuWithMagneticField(rec), FieldSlot::MagneticField(field)) => {
                rec.magnetic_field = Some(field);
                true
            }
            (UnitRecord::Imu(_), FieldSlot::MagneticField(_)) => false,
            (record, FieldSlot::LinearAcceleration(value)) => {
                record.imu_mut().linear_acceleration = Some(value);
                true
            }
            (record, FieldSlot::AngularVelocity(value)) => {
                record.imu_mut().angular_velocity = Some(value);
                true
            }
            (record, FieldSlot::Orientation(value)) => {
                record.imu_mut().orientation = Some(value);
                true
            }
        }
    }
}
