//! cubetime Time Engine - reconciling device and host clocks
//!
//! This crate implements the reconciliation layer:
//! - Host clocks (monotonic and manual/virtual)
//! - MoveWindow: bounded FIFO of the most recent move samples
//! - SkewEstimator: device vs host clock rate deviation
//! - TimelineFitter: regression-smoothed, monotonic per-move timestamps
//! - ReconcileEngine: ingestion and on-demand estimation over the window

pub mod clock;
pub mod engine;
pub mod fit;
pub mod skew;
pub mod window;

pub use clock::*;
pub use engine::*;
pub use fit::*;
pub use skew::*;
pub use window::*;
