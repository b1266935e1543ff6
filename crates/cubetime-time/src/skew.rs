//! Clock skew estimation
//!
//! Skew is the rate deviation between host and device clocks over the
//! window: `(host elapsed / device elapsed - 1) * 100`. Zero when the
//! clocks agree; +100% when the device counts at half the host rate.

use std::fmt;

use cubetime_core::{unwrap_device_series, MoveSample};

use crate::fit::{has_spread, least_squares};

/// Samples needed before a skew figure is worth showing
pub const DEFAULT_MIN_SKEW_SAMPLES: usize = 10;

/// Skew estimate derived from one window snapshot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkewResult {
    pub skew_percent: f64,
    /// Number of samples the estimate was computed from
    pub samples: usize,
}

impl fmt::Display for SkewResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}%", self.skew_percent)
    }
}

/// Skew estimator. Holds configuration only; every call recomputes
/// from the snapshot it is given.
#[derive(Clone, Copy, Debug)]
pub struct SkewEstimator {
    min_samples: usize,
}

impl SkewEstimator {
    pub fn new() -> Self {
        Self::with_min_samples(DEFAULT_MIN_SKEW_SAMPLES)
    }

    pub fn with_min_samples(min_samples: usize) -> Self {
        SkewEstimator {
            min_samples: min_samples.max(2),
        }
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Skew over `samples`, or `None` while fewer than the configured
    /// minimum are available.
    pub fn estimate(&self, samples: &[MoveSample]) -> Option<SkewResult> {
        if samples.len() < self.min_samples {
            return None;
        }
        Self::estimate_unchecked(samples)
    }

    /// Skew from as few as two samples. `None` when there are fewer, or
    /// when the device timestamps have no spread.
    pub fn estimate_unchecked(samples: &[MoveSample]) -> Option<SkewResult> {
        let first = samples.first()?;
        if samples.len() < 2 {
            return None;
        }

        let device = unwrap_device_series(samples);
        let host_origin = first.host_arrival.as_millis();
        let xs: Vec<f64> = device.iter().map(|d| *d as f64 - device[0] as f64).collect();
        if !has_spread(&xs) {
            return None;
        }

        let ys: Vec<f64> = samples
            .iter()
            .map(|s| s.host_arrival.as_millis().saturating_sub(host_origin) as f64)
            .collect();

        let fit = least_squares(&xs, &ys)?;
        Some(SkewResult {
            skew_percent: (fit.slope - 1.0) * 100.0,
            samples: samples.len(),
        })
    }
}

impl Default for SkewEstimator {
    fn default() -> Self {
        Self::new()
    }
}
