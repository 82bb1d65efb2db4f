//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Samples are stamped on a steady monotonic clock (`MonotonicTime`)
//! - Output records are stamped on the external reference clock (`ReferenceTime`)
//! - The mapping between both is owned by `time_base::TimeBase`

mod config;
mod detection;
mod error;
mod record;
mod sample;
mod time;

pub use config::*;
pub use detection::*;
pub use error::*;
pub use record::*;
pub use sample::*;
pub use time::*;
