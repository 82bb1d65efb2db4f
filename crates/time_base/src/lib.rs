//! # Time Base
//!
//! Reconciles the monotonic clock the driver stamps samples with and the
//! external reference clock presented to bus consumers.
//!
//! 负责：
//! - 初始锚点捕获
//! - 按需 rebase，吸收参考时钟跳变
//! - 漂移累计（仅用于诊断）
//!
//! ## 使用示例
//!
//! ```
//! use contracts::TimeBaseConfig;
//! use time_base::{monotonic_now, TimeBase};
//!
//! let mut base = TimeBase::new(&TimeBaseConfig::default());
//! let stamp = base.translate(monotonic_now());
//!
//! // After an NTP step, absorb the discontinuity
//! let event = base.rebase();
//! assert_eq!(event.total_change_ns, base.drift().total_change_ns());
//! # let _ = stamp;
//! ```

mod base;
mod clock;

pub use base::{ClockAnchor, DriftLedger, TimeBase};
pub use clock::{monotonic_now, ClockSource, ManualClock, SystemClock};
