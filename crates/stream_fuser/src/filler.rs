//! Reading to record field conversion.

use contracts::{
    diagonal_covariance, CovarianceConfig, FieldSlot, Measured, Quaternion, Reading,
    UNKNOWN_COVARIANCE,
};

/// Turns readings into populated record slots with their configured covariance
#[derive(Debug, Clone)]
pub struct FieldFiller {
    covariance: CovarianceConfig,
    enable_rotation: bool,
}

impl FieldFiller {
    pub fn new(covariance: CovarianceConfig, enable_rotation: bool) -> Self {
        Self {
            covariance,
            enable_rotation,
        }
    }

    /// Slot for a reading of any kind
    pub fn slot(&self, reading: &Reading) -> FieldSlot {
        match *reading {
            Reading::Accelerometer(value) => FieldSlot::LinearAcceleration(Measured::new(
                value,
                diagonal_covariance(self.covariance.linear_acceleration),
            )),
            Reading::Gyroscope(value) => FieldSlot::AngularVelocity(Measured::new(
                value,
                diagonal_covariance(self.covariance.angular_velocity),
            )),
            Reading::RotationVector { orientation, .. } if self.enable_rotation => {
                FieldSlot::Orientation(Measured::new(
                    orientation,
                    diagonal_covariance(self.covariance.rotation),
                ))
            }
            Reading::RotationVector { .. } => Self::orientation_unreported(),
            Reading::MagneticField(value) => FieldSlot::MagneticField(Measured::new(
                value,
                diagonal_covariance(self.covariance.magnetic_field),
            )),
        }
    }

    /// Identity orientation with unknown covariance
    pub fn orientation_unreported() -> FieldSlot {
        FieldSlot::Orientation(Measured::new(Quaternion::identity(), UNKNOWN_COVARIANCE))
    }

    pub fn rotation_enabled(&self) -> bool {
        self.enable_rotation
    }
}
