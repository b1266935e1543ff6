//! cubetime Runtime - solve timer and event loop
//!
//! This crate drives the solve timer from three inputs processed
//! strictly in arrival order on one task:
//! 1. Cube events (moves, connect/disconnect)
//! 2. Solved-pattern notifications
//! 3. User activation
//!
//! Timer transitions are a pure function of (state, input). The
//! controller applies their side effects and publishes display state.

pub mod clock;
pub mod controller;
pub mod display;
pub mod logging;
pub mod session;
pub mod source;
pub mod timer;

pub use clock::*;
pub use controller::*;
pub use display::*;
pub use session::*;
pub use source::*;
pub use timer::*;
