//! # Stream Fuser
//!
//! Fuses accelerometer, gyroscope, rotation vector and magnetic field
//! sub-streams into unit records, one per accelerometer sample.
//!
//! - `SyncPolicy::Copy`: pair with the latest sample of every other kind
//! - `SyncPolicy::LinearInterpolate`: resample every other kind at the
//!   accelerometer instant, holding boundary values
//!
//! ## 使用示例
//!
//! ```
//! use contracts::{ImuConverterConfig, MonotonicTime, RawSample, Reading, Vector3};
//! use stream_fuser::StreamFuser;
//!
//! let mut fuser = StreamFuser::new(&ImuConverterConfig::new("imu"));
//! let accel = RawSample::new(
//!     Reading::Accelerometer(Vector3::new(0.0, 0.0, 9.8)),
//!     MonotonicTime::from_nanos(1_000),
//!     0,
//! );
//!
//! let units = fuser.fuse(&[accel]);
//! assert_eq!(units.len(), 1);
//! ```

mod filler;
mod fuser;
mod history;
mod interpolate;

pub use filler::FieldFiller;
pub use fuser::{FusedUnit, StreamFuser};
pub use history::StreamHistory;
pub use interpolate::{sample_at, Lerp};
