//! Solve Simulator - full simulation harness for timer testing
//!
//! Simulates:
//! - A cube whose clock drifts and wraps relative to the host
//! - Bluetooth transport latency and jitter on every move
//! - Moves recovered from device history without a timestamp
//! - Complete solves driven through the timer controller

use std::time::Duration;

use cubetime_core::{CubeEvent, FaceMove, HostTime, MoveEvent, FULL_COUNTER_PERIOD};
use cubetime_runtime::{SolveRecord, TimerController, TimerState};
use cubetime_time::{HostClock, ManualClock, ReconcileConfig, SkewResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Device clock drift model
#[derive(Clone, Debug)]
pub struct ClockDriftModel {
    /// Device units per host millisecond (1.0 = perfect, >1.0 = fast)
    pub drift_rate: f64,
    /// Device counter value at host time zero
    pub offset: u64,
}

impl ClockDriftModel {
    pub fn new(drift_rate: f64, offset: u64) -> Self {
        ClockDriftModel { drift_rate, offset }
    }

    /// Perfect clock (no drift)
    pub fn perfect() -> Self {
        Self::new(1.0, 0)
    }

    /// Device clock 2% fast
    pub fn fast() -> Self {
        Self::new(1.02, 0)
    }

    /// Device clock 2% slow
    pub fn slow() -> Self {
        Self::new(0.98, 0)
    }

    /// Device clock at half the host rate
    pub fn half_speed() -> Self {
        Self::new(0.5, 0)
    }

    /// Unbounded device reading at `host_ms`
    pub fn device_time(&self, host_ms: u64) -> u64 {
        self.offset + (host_ms as f64 * self.drift_rate).round() as u64
    }
}

/// Transport delay between a physical turn and its host arrival
#[derive(Clone, Debug)]
pub struct TransportModel {
    pub base_latency_ms: u64,
    /// Extra uniform delay in `0..=jitter_ms`
    pub jitter_ms: u64,
}

impl TransportModel {
    pub fn ideal() -> Self {
        TransportModel {
            base_latency_ms: 0,
            jitter_ms: 0,
        }
    }

    pub fn typical() -> Self {
        TransportModel {
            base_latency_ms: 20,
            jitter_ms: 60,
        }
    }

    pub fn congested() -> Self {
        TransportModel {
            base_latency_ms: 45,
            jitter_ms: 150,
        }
    }

    pub fn delay(&self, rng: &mut StdRng) -> u64 {
        let jitter = if self.jitter_ms > 0 {
            rng.gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        self.base_latency_ms + jitter
    }
}

/// One simulated turn
#[derive(Clone, Copy, Debug)]
pub struct SimulatedMove {
    pub event: MoveEvent,
    /// When the face was physically turned
    pub turned_at: HostTime,
    /// When the host received it
    pub arrival: HostTime,
    /// Unbounded device reading (also for recovered moves)
    pub device_time: u64,
}

/// Simulated cube with its own clock and radio link
pub struct SimulatedCube {
    pub drift: ClockDriftModel,
    pub transport: TransportModel,
    wrap_period: u64,
    recovered_every: Option<usize>,
    rng: StdRng,
    /// Host time of the latest physical turn
    now: u64,
    last_arrival: Option<u64>,
    turns: usize,
}

impl SimulatedCube {
    pub fn new(drift: ClockDriftModel, transport: TransportModel, seed: u64) -> Self {
        SimulatedCube {
            drift,
            transport,
            wrap_period: FULL_COUNTER_PERIOD,
            recovered_every: None,
            rng: StdRng::seed_from_u64(seed),
            now: 0,
            last_arrival: None,
            turns: 0,
        }
    }

    /// Counter wrapping at `period`
    pub fn with_wrap_period(mut self, period: u64) -> Self {
        self.wrap_period = period.max(1);
        self
    }

    /// Every `n`th move arrives without a device timestamp
    pub fn with_recovered_every(mut self, n: usize) -> Self {
        self.recovered_every = Some(n.max(1));
        self
    }

    pub fn wrap_period(&self) -> u64 {
        self.wrap_period
    }

    /// Turn a face `gap` after the previous turn
    pub fn turn(&mut self, face_move: FaceMove, gap: Duration) -> SimulatedMove {
        self.now += gap.as_millis() as u64;
        self.turns += 1;

        let device_time = self.drift.device_time(self.now);
        let recovered = self.recovered_every.is_some_and(|n| self.turns % n == 0);
        let event = if recovered {
            MoveEvent::recovered(face_move)
        } else {
            MoveEvent::new(face_move, (device_time % self.wrap_period) as u32)
        };

        // The radio link preserves order
        let mut arrival = self.now + self.transport.delay(&mut self.rng);
        if let Some(last) = self.last_arrival {
            arrival = arrival.max(last + 1);
        }
        self.last_arrival = Some(arrival);

        SimulatedMove {
            event,
            turned_at: HostTime::from_millis(self.now),
            arrival: HostTime::from_millis(arrival),
            device_time,
        }
    }

    /// Let time pass without turning
    pub fn idle(&mut self, duration: Duration) {
        self.now += duration.as_millis() as u64;
    }
}

/// Outcome of one simulated solve
#[derive(Clone, Debug)]
pub struct SolveOutcome {
    /// Physical time from first to last turn
    pub true_ms: u64,
    /// What the timer recorded
    pub record: SolveRecord,
    /// Device counter span, read naively
    pub device_ms: u64,
}

impl SolveOutcome {
    pub fn fitted_error_ms(&self) -> u64 {
        self.record.final_ms.abs_diff(self.true_ms)
    }

    pub fn raw_error_ms(&self) -> u64 {
        self.record.raw_ms.abs_diff(self.true_ms)
    }

    pub fn device_error_ms(&self) -> u64 {
        self.device_ms.abs_diff(self.true_ms)
    }
}

/// Drives complete solves from a simulated cube through a controller
pub struct SolveSimulator {
    cube: SimulatedCube,
    clock: ManualClock,
    controller: TimerController<ManualClock>,
    rng: StdRng,
    /// Range of pauses between turns
    gap_ms: (u64, u64),
}

impl SolveSimulator {
    pub fn new(cube: SimulatedCube, seed: u64) -> Self {
        let config = ReconcileConfig::default().with_wrap_period(cube.wrap_period());
        let clock = ManualClock::new();
        let mut controller = TimerController::with_config(clock.clone(), config);
        controller.handle_event(CubeEvent::Connect);

        SolveSimulator {
            cube,
            clock,
            controller,
            rng: StdRng::seed_from_u64(seed),
            gap_ms: (150, 400),
        }
    }

    pub fn with_gaps(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.gap_ms = (min_ms.min(max_ms), max_ms.max(min_ms));
        self
    }

    /// Arm the timer, perform `moves`, then report the solved pattern.
    /// Returns `None` if the timer did not stop.
    pub fn run_solve(&mut self, moves: &[FaceMove]) -> Option<SolveOutcome> {
        if self.controller.state() != TimerState::Idle {
            self.controller.activate();
        }
        self.controller.activate();
        self.cube.idle(Duration::from_secs(2));

        let mut turned = Vec::with_capacity(moves.len());
        for face_move in moves {
            let gap = self.rng.gen_range(self.gap_ms.0..=self.gap_ms.1);
            let m = self.cube.turn(*face_move, Duration::from_millis(gap));
            self.deliver(&m);
            turned.push(m);
        }
        self.controller.on_pattern(true);

        if self.controller.state() != TimerState::Stopped {
            return None;
        }
        let first = turned.first()?;
        let last = turned.last()?;
        Some(SolveOutcome {
            true_ms: last.turned_at.millis_since(first.turned_at),
            record: self.controller.last_solve()?.clone(),
            device_ms: last.device_time - first.device_time,
        })
    }

    /// Turn without an armed timer, e.g. scrambling
    pub fn scramble(&mut self, moves: &[FaceMove]) {
        for face_move in moves {
            let gap = self.rng.gen_range(self.gap_ms.0..=self.gap_ms.1);
            let m = self.cube.turn(*face_move, Duration::from_millis(gap));
            self.deliver(&m);
        }
    }

    fn deliver(&mut self, m: &SimulatedMove) {
        self.clock.set(m.arrival);
        self.controller.handle_event(CubeEvent::Move(m.event));
    }

    pub fn skew(&self) -> Option<SkewResult> {
        self.controller.engine().skew()
    }

    pub fn controller(&self) -> &TimerController<ManualClock> {
        &self.controller
    }

    pub fn now(&self) -> HostTime {
        self.clock.now()
    }
}

/// Predefined simulation scenarios
pub mod scenarios {
    use super::*;

    /// Perfect clock, instant transport
    pub fn perfect() -> SolveSimulator {
        SolveSimulator::new(
            SimulatedCube::new(ClockDriftModel::perfect(), TransportModel::ideal(), 1),
            1,
        )
    }

    /// Fast device clock, instant transport
    pub fn drifting() -> SolveSimulator {
        SolveSimulator::new(
            SimulatedCube::new(ClockDriftModel::fast(), TransportModel::ideal(), 2),
            2,
        )
    }

    /// Perfect clock over a jittery link
    pub fn jittery(seed: u64) -> SolveSimulator {
        SolveSimulator::new(
            SimulatedCube::new(ClockDriftModel::perfect(), TransportModel::typical(), seed),
            seed,
        )
    }

    /// 16-bit device counter starting just before its wrap
    pub fn wrapping() -> SolveSimulator {
        let drift = ClockDriftModel::new(1.0, 60_000);
        SolveSimulator::new(
            SimulatedCube::new(drift, TransportModel::ideal(), 3).with_wrap_period(1 << 16),
            3,
        )
    }

    /// Drifting clock, congested link, some moves without timestamps
    pub fn hostile(seed: u64) -> SolveSimulator {
        let cube = SimulatedCube::new(ClockDriftModel::slow(), TransportModel::congested(), seed)
            .with_recovered_every(10);
        SolveSimulator::new(cube, seed)
    }
}

/// Deterministic move sequence of `count` turns
pub fn move_sequence(count: usize) -> Vec<FaceMove> {
    (0..count)
        .map(|i| FaceMove::from_index((i * 7 % FaceMove::COUNT as usize) as u8))
        .collect::<Result<_, _>>()
        .unwrap_or_default()
}
