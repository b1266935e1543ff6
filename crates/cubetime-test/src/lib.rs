//! cubetime Test Harness - simulated cubes and solves
//!
//! This crate provides:
//! - Device clock drift and wraparound simulation
//! - Bluetooth transport latency and jitter simulation
//! - Full solve simulation through the timer controller
//! - End-to-end session tests

pub mod integration;
pub mod time_simulator;

pub use integration::*;
pub use time_simulator::*;
