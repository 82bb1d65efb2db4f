//! Converter configuration contracts shared across crates.
//!
//! Set once at construction, immutable afterwards.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::RecordShape;

/// Default change threshold below which a rebase diff is treated as noise
pub const DEFAULT_CHANGE_THRESHOLD_NS: i64 = 100;

/// Default per-kind history depth kept by the fuser
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// Largest per-kind history depth accepted by validation
pub const MAX_HISTORY_CAPACITY: usize = 65_536;

/// Top level bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BridgeConfig {
    /// Time base configuration, shared by every converter
    #[serde(default)]
    #[validate(nested)]
    pub time_base: TimeBaseConfig,

    /// IMU converter (optional)
    #[validate(nested)]
    pub imu: Option<ImuConverterConfig>,

    /// Detection converter (optional)
    #[validate(nested)]
    pub detection: Option<DetectionConverterConfig>,
}

/// Time base configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TimeBaseConfig {
    /// Rebase diffs with |diff| above this are reported as a clock change (ns)
    #[serde(default = "default_change_threshold_ns")]
    #[validate(range(min = 0))]
    pub change_threshold_ns: i64,
}

impl Default for TimeBaseConfig {
    fn default() -> Self {
        Self {
            change_threshold_ns: DEFAULT_CHANGE_THRESHOLD_NS,
        }
    }
}

fn default_change_threshold_ns() -> i64 {
    DEFAULT_CHANGE_THRESHOLD_NS
}

/// Policy aligning the non-pacing streams onto accelerometer instants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Pair each accelerometer sample with the latest sample of every other kind
    Copy,
    /// Resample every other kind at the accelerometer instants
    #[default]
    LinearInterpolate,
}

/// Clock domain feeding the time base
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// Host-side capture clock (synchronised with the host steady clock)
    #[default]
    Host,
    /// The device's own clock
    Device,
}

/// Per-modality variance placed on the covariance diagonal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CovarianceConfig {
    #[serde(default)]
    #[validate(range(min = 0.0), custom(function = "validate_finite"))]
    pub linear_acceleration: f64,

    #[serde(default)]
    #[validate(range(min = 0.0), custom(function = "validate_finite"))]
    pub angular_velocity: f64,

    #[serde(default)]
    #[validate(range(min = 0.0), custom(function = "validate_finite"))]
    pub rotation: f64,

    #[serde(default)]
    #[validate(range(min = 0.0), custom(function = "validate_finite"))]
    pub magnetic_field: f64,
}

/// `range` lets NaN and infinities through
fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        let mut err = ValidationError::new("finite");
        err.message = Some(format!("covariance must be finite, got {value}").into());
        Err(err)
    }
}

/// IMU converter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ImuConverterConfig {
    /// Frame identifier copied into every record header
    #[validate(length(min = 1))]
    pub frame_id: String,

    #[serde(default)]
    pub sync_policy: SyncPolicy,

    #[serde(default)]
    pub record_shape: RecordShape,

    #[serde(default)]
    pub timestamp_source: TimestampSource,

    /// Report orientation; when disabled orientation is identity with unknown covariance
    #[serde(default)]
    pub enable_rotation: bool,

    /// Samples kept per kind across batches
    #[serde(default = "default_history_capacity")]
    #[validate(range(min = 2, max = MAX_HISTORY_CAPACITY))]
    pub history_capacity: usize,

    #[serde(default)]
    #[validate(nested)]
    pub covariance: CovarianceConfig,
}

impl ImuConverterConfig {
    /// Configuration with defaults for everything but the frame identifier.
    pub fn new(frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
            sync_policy: SyncPolicy::default(),
            record_shape: RecordShape::default(),
            timestamp_source: TimestampSource::default(),
            enable_rotation: false,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            covariance: CovarianceConfig::default(),
        }
    }
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// Detection converter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DetectionConverterConfig {
    #[validate(length(min = 1))]
    pub frame_id: String,

    /// Input image width in pixels
    #[validate(range(min = 1))]
    pub width: u32,

    /// Input image height in pixels
    #[validate(range(min = 1))]
    pub height: u32,

    /// Keep box coordinates normalised instead of scaling to pixels
    #[serde(default)]
    pub normalized: bool,

    #[serde(default)]
    pub timestamp_source: TimestampSource,
}

impl DetectionConverterConfig {
    pub fn new(frame_id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            frame_id: frame_id.into(),
            width,
            height,
            normalized: false,
            timestamp_source: TimestampSource::default(),
        }
    }
}
