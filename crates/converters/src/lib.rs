//! # Converters
//!
//! Stamps converter output with the reference clock and appends it to the
//! caller's output queue.
//!
//! - `ImuConverter`: fused IMU unit records
//! - `DetectionConverter`: bounding box arrays from device detections
//!
//! Each converter owns the `TimeBase` of the clock it reads; call
//! `rebase()` periodically or when the reference clock is known to have
//! changed.
//!
//! ## 使用示例
//!
//! ```
//! use std::collections::VecDeque;
//! use contracts::{ImuConverterConfig, RawSample, Reading, TimeBaseConfig, Vector3};
//! use converters::ImuConverter;
//!
//! let mut converter =
//!     ImuConverter::new(ImuConverterConfig::new("imu"), &TimeBaseConfig::default()).unwrap();
//!
//! let sample = RawSample::new(
//!     Reading::Accelerometer(Vector3::new(0.0, 0.0, 9.8)),
//!     time_base::monotonic_now(),
//!     0,
//! );
//!
//! let mut out = VecDeque::new();
//! converter.to_records(&[sample], &mut out);
//! assert_eq!(out.len(), 1);
//! ```

mod detection;
mod imu;

pub use detection::DetectionConverter;
pub use imu::ImuConverter;
