//! Reconcile Engine - owns the move window and derives skew and fitted
//! timelines from it on demand

use cubetime_core::{DeviceTimestamp, HostTime, MoveEvent, MoveSample, FULL_COUNTER_PERIOD};

use crate::{
    FittedTimeline, MoveWindow, SkewEstimator, SkewResult, TimelineFitter, WindowSnapshot,
    DEFAULT_MIN_SKEW_SAMPLES, DEFAULT_WINDOW_CAPACITY,
};

/// Reconcile Engine configuration
#[derive(Clone, Debug)]
pub struct ReconcileConfig {
    /// Samples kept in the rolling window
    pub window_capacity: usize,
    /// Samples required before skew is reported
    pub min_skew_samples: usize,
    /// Wraparound period of the device counter
    pub wrap_period: u64,
    /// Gap assumed before a move that arrives without a device timestamp
    pub missing_timestamp_step_ms: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            min_skew_samples: DEFAULT_MIN_SKEW_SAMPLES,
            wrap_period: FULL_COUNTER_PERIOD,
            missing_timestamp_step_ms: 50,
        }
    }
}

impl ReconcileConfig {
    /// Smaller window, tracks drift changes faster
    pub fn low_latency() -> Self {
        ReconcileConfig {
            window_capacity: 128,
            ..Self::default()
        }
    }

    /// Device counter wrapping at `period` instead of 2^32.
    /// 0 selects the full 32-bit counter.
    pub fn with_wrap_period(mut self, period: u64) -> Self {
        self.wrap_period = DeviceTimestamp::new(0, period).period();
        self
    }
}

/// Reconcile Engine
pub struct ReconcileEngine {
    window: MoveWindow,
    skew: SkewEstimator,
    fitter: TimelineFitter,
    /// Last device timestamp placed on the unbounded timeline
    last_device: Option<u64>,
    config: ReconcileConfig,
}

impl ReconcileEngine {
    pub fn new() -> Self {
        Self::with_config(ReconcileConfig::default())
    }

    pub fn with_config(mut config: ReconcileConfig) -> Self {
        config.wrap_period = DeviceTimestamp::new(0, config.wrap_period).period();
        ReconcileEngine {
            window: MoveWindow::with_capacity(config.window_capacity),
            skew: SkewEstimator::with_min_samples(config.min_skew_samples),
            fitter: TimelineFitter::new(),
            last_device: None,
            config,
        }
    }

    /// Turn a device move into a sample stamped at `arrival` and record
    /// it in the window. Returns the recorded sample.
    pub fn ingest(&mut self, event: MoveEvent, arrival: HostTime) -> MoveSample {
        let device_timestamp = self.device_timestamp(event.device_timestamp);
        let mut sample = MoveSample::new(event.face_move, device_timestamp, arrival);

        self.window.record(sample);
        if let Some(recorded) = self.window.newest() {
            sample = *recorded;
        }

        tracing::debug!(
            face_move = %sample.face_move,
            device = ?sample.device_timestamp,
            arrival = ?sample.host_arrival,
            window = self.window.len(),
            "move recorded"
        );
        sample
    }

    /// Resolve the device timestamp of a move, filling in one for moves
    /// recovered without it.
    fn device_timestamp(&mut self, raw: Option<u32>) -> DeviceTimestamp {
        let period = self.config.wrap_period;
        let ts = match raw {
            Some(raw) => DeviceTimestamp::new(raw, period),
            None => {
                let filled = self
                    .last_device
                    .map_or(0, |prev| prev + self.config.missing_timestamp_step_ms);
                tracing::debug!(filled, "move without device timestamp");
                DeviceTimestamp::new((filled % period) as u32, period)
            }
        };

        let unwrapped = match self.last_device {
            Some(prev) => ts.unwrap_relative_to(prev),
            None => u64::from(ts.raw()),
        };
        self.last_device = Some(unwrapped);
        ts
    }

    /// Current skew, once enough samples are in the window
    pub fn skew(&self) -> Option<SkewResult> {
        self.skew.estimate(&self.window.snapshot())
    }

    /// Fitted timeline over the whole window
    pub fn fit(&self) -> FittedTimeline {
        self.fitter.fit(&self.window.snapshot())
    }

    /// Fitted timeline over an arbitrary sample run, e.g. one solve
    pub fn fit_samples(&self, samples: &[MoveSample]) -> FittedTimeline {
        self.fitter.fit(samples)
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.window.snapshot()
    }

    pub fn window(&self) -> &MoveWindow {
        &self.window
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Forget all samples and the device timeline (new connection)
    pub fn reset(&mut self) {
        self.window.clear();
        self.last_device = None;
    }
}

impl Default for ReconcileEngine {
    fn default() -> Self {
        Self::new()
    }
}
