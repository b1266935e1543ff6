//! Timeline fitting - regression-smoothed move timestamps
//!
//! Host arrival times carry the jitter of the Bluetooth transport;
//! device timestamps carry the drift of the device clock. Fitting host
//! arrival against device time over many moves gives a line that has
//! the host's rate and none of the transport jitter. Projecting each
//! move onto that line yields its corrected timestamp.

use cubetime_core::{unwrap_device_series, MoveSample};

/// Below this variance of the independent variable the slope is
/// meaningless and taken as 1:1
const MIN_VARIANCE: f64 = 1e-3;

/// Line fitted by ordinary least squares
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    #[inline]
    pub fn project(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least-squares fit of `ys` against `xs`.
///
/// Sums are taken around the means so large absolute timestamps do not
/// lose precision. With no spread in `xs` the slope falls back to 1.
/// Returns `None` for empty input or mismatched lengths.
pub fn least_squares(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    if xs.is_empty() || xs.len() != ys.len() {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut sxx, mut sxy) = (0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    let slope = if sxx / n < MIN_VARIANCE { 1.0 } else { sxy / sxx };
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Whether `xs` spread enough for a fitted slope to mean anything.
/// Below this, `least_squares` falls back to a 1:1 slope.
pub fn has_spread(xs: &[f64]) -> bool {
    if xs.is_empty() {
        return false;
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let variance = xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    variance >= MIN_VARIANCE
}

/// A sample with its corrected timestamp
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FittedSample {
    pub sample: MoveSample,
    /// Milliseconds since the first sample of the fitted sequence
    pub corrected_timestamp: u64,
}

/// Corrected timestamps, parallel to the input samples
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FittedTimeline {
    samples: Vec<FittedSample>,
    fit: Option<LinearFit>,
}

impl FittedTimeline {
    pub fn samples(&self) -> &[FittedSample] {
        &self.samples
    }

    pub fn corrected_timestamps(&self) -> Vec<u64> {
        self.samples.iter().map(|s| s.corrected_timestamp).collect()
    }

    /// Line the timeline was projected from
    pub fn fit(&self) -> Option<LinearFit> {
        self.fit
    }

    pub fn first(&self) -> Option<&FittedSample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&FittedSample> {
        self.samples.last()
    }

    /// Corrected time from the first to the last sample
    pub fn elapsed_ms(&self) -> u64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last.corrected_timestamp - first.corrected_timestamp,
            _ => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Timeline fitter. Stateless: the output depends on the input alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimelineFitter;

impl TimelineFitter {
    pub fn new() -> Self {
        TimelineFitter
    }

    /// Fit corrected timestamps for `samples` (oldest first).
    ///
    /// Output has the same length and order as the input, starts at 0,
    /// and never decreases. An empty input gives an empty timeline.
    pub fn fit(&self, samples: &[MoveSample]) -> FittedTimeline {
        let Some(first) = samples.first() else {
            return FittedTimeline::default();
        };

        let device = unwrap_device_series(samples);
        let device_origin = device[0];
        let host_origin = first.host_arrival.as_millis();

        // A late sample may read below the first one
        let xs: Vec<f64> = device
            .iter()
            .map(|d| *d as f64 - device_origin as f64)
            .collect();
        let ys: Vec<f64> = samples
            .iter()
            .map(|s| s.host_arrival.as_millis().saturating_sub(host_origin) as f64)
            .collect();

        let Some(fit) = least_squares(&xs, &ys) else {
            return FittedTimeline::default();
        };

        let zero = fit.project(xs[0]).round() as i64;
        let mut previous = 0i64;
        let mut fitted = Vec::with_capacity(samples.len());

        for (sample, x) in samples.iter().zip(&xs) {
            let mut corrected = fit.project(*x).round() as i64 - zero;
            if corrected < previous {
                tracing::debug!(
                    corrected,
                    previous,
                    face_move = %sample.face_move,
                    "fitted timestamp went backwards, clamped"
                );
                corrected = previous;
            }
            previous = corrected;
            fitted.push(FittedSample {
                sample: *sample,
                corrected_timestamp: corrected as u64,
            });
        }

        FittedTimeline {
            samples: fitted,
            fit: Some(fit),
        }
    }
}
