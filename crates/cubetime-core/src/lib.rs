//! cubetime Core - Fundamental types and primitives
//!
//! This crate defines the types shared by the reconciliation engine
//! and the solve timer:
//! - Face moves (18 face turns) and their notation
//! - Time primitives (HostTime, DeviceTimestamp)
//! - Move samples and cube events
//! - Facelet patterns and the solved configuration

pub mod error;
pub mod event;
pub mod moves;
pub mod pattern;
pub mod sample;
pub mod time;

pub use error::*;
pub use event::*;
pub use moves::*;
pub use pattern::*;
pub use sample::*;
pub use time::*;
