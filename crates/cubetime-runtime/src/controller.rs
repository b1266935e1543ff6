//! Timer controller - the single owner of timer state
//!
//! All inputs go through one `&mut self` path, in arrival order. The
//! controller feeds moves into the reconcile engine, runs the pure timer
//! transition, applies its effects and publishes display state.

use cubetime_core::{CubeEvent, FaceMove, HostTime, MoveEvent, MoveSample};
use cubetime_time::{HostClock, ReconcileConfig, ReconcileEngine};

use crate::{transition, DisplayHandle, TimerEffect, TimerInput, TimerState};

/// A finished solve
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveRecord {
    /// Fitted time from the first to the last solve move
    pub final_ms: u64,
    /// Host-arrival time over the same moves, before fitting
    pub raw_ms: u64,
    pub moves: Vec<FaceMove>,
}

#[derive(Clone, Debug, Default)]
pub struct ControllerStats {
    pub moves: u64,
    pub solves: u64,
    pub discarded_solves: u64,
    pub ticks: u64,
    pub ignored_inputs: u64,
}

/// Timer controller
pub struct TimerController<C: HostClock> {
    state: TimerState,
    connected: bool,
    engine: ReconcileEngine,
    /// Moves recorded since entering RUNNING
    solve_log: Vec<MoveSample>,
    /// Host time RUNNING was entered, drives the live ticker
    running_since: Option<HostTime>,
    ticker_active: bool,
    last_solve: Option<SolveRecord>,
    clock: C,
    display: DisplayHandle,
    stats: ControllerStats,
}

impl<C: HostClock> TimerController<C> {
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, ReconcileConfig::default())
    }

    pub fn with_config(clock: C, config: ReconcileConfig) -> Self {
        TimerController {
            state: TimerState::Idle,
            connected: false,
            engine: ReconcileEngine::with_config(config),
            solve_log: Vec::new(),
            running_since: None,
            ticker_active: false,
            last_solve: None,
            clock,
            display: DisplayHandle::new(),
            stats: ControllerStats::default(),
        }
    }

    /// Handle one cube event
    pub fn handle_event(&mut self, event: CubeEvent) {
        match event {
            CubeEvent::Connect => {
                tracing::info!("device connected");
                self.connected = true;
            }
            CubeEvent::Disconnect => {
                tracing::info!(state = %self.state, "device disconnected");
                self.connected = false;
                self.apply(TimerInput::Disconnect);
                self.engine.reset();
                self.display.update(|d| d.skew = None);
            }
            CubeEvent::Move(mv) => self.on_move(mv),
            CubeEvent::Facelets(facelets) => {
                tracing::debug!(solved = facelets.is_solved(), "facelets reported");
            }
            other => tracing::trace!(kind = %other.kind(), "event ignored by timer"),
        }
    }

    fn on_move(&mut self, mv: MoveEvent) {
        let arrival = self.clock.now();
        let sample = self.engine.ingest(mv, arrival);
        self.stats.moves += 1;

        self.apply(TimerInput::Move);
        if self.state == TimerState::Running {
            self.solve_log.push(sample);
        }

        let skew = self.engine.skew();
        self.display.update(|d| d.skew = skew);
    }

    /// Solved-pattern notification
    pub fn on_pattern(&mut self, solved: bool) {
        if solved {
            self.apply(TimerInput::Solved);
        }
    }

    /// User activation gesture
    pub fn activate(&mut self) {
        self.apply(TimerInput::Activate {
            connected: self.connected,
        });
    }

    /// Manual reset
    pub fn reset(&mut self) {
        self.apply(TimerInput::Reset);
    }

    /// Live ticker fired. Updates the interpolated elapsed value only.
    pub fn tick(&mut self) {
        if !self.ticker_active {
            return;
        }
        let Some(since) = self.running_since else {
            return;
        };
        self.stats.ticks += 1;
        let elapsed = self.clock.now().millis_since(since);
        self.display.update(|d| d.elapsed_ms = elapsed);
    }

    /// Run one input through the state machine and apply its effects.
    /// Returns the effects that were applied.
    fn apply(&mut self, input: TimerInput) -> Vec<TimerEffect> {
        let from = self.state;
        let t = transition(from, input);

        if t.is_noop(from) {
            if !matches!(input, TimerInput::Move) {
                self.stats.ignored_inputs += 1;
                tracing::trace!(state = %from, ?input, "input ignored");
            }
            return t.effects;
        }

        tracing::info!(from = %from, to = %t.state, ?input, "timer transition");
        self.state = t.state;
        for effect in &t.effects {
            self.run_effect(*effect);
        }

        let state = self.state;
        self.display.update(|d| d.timer_state = state);
        t.effects
    }

    fn run_effect(&mut self, effect: TimerEffect) {
        match effect {
            TimerEffect::ResetDisplay => self.display.update(|d| {
                d.visible = true;
                d.elapsed_ms = 0;
            }),
            TimerEffect::ClearSolveLog => self.solve_log.clear(),
            TimerEffect::StartTicker => {
                self.running_since = Some(self.clock.now());
                self.ticker_active = true;
            }
            TimerEffect::StopTicker => {
                self.ticker_active = false;
                self.running_since = None;
            }
            TimerEffect::RecordFinalTime => self.record_final_time(),
            TimerEffect::DiscardSolve => {
                tracing::info!(moves = self.solve_log.len(), "in-flight solve discarded");
                self.stats.discarded_solves += 1;
                self.solve_log.clear();
            }
            TimerEffect::HideTimer => self.display.update(|d| d.visible = false),
        }
    }

    fn record_final_time(&mut self) {
        let timeline = self.engine.fit_samples(&self.solve_log);
        let final_ms = timeline.elapsed_ms();
        let raw_ms = match (self.solve_log.first(), self.solve_log.last()) {
            (Some(first), Some(last)) => last.host_arrival.millis_since(first.host_arrival),
            _ => 0,
        };

        tracing::info!(
            final_ms,
            raw_ms,
            moves = self.solve_log.len(),
            "solve finished"
        );

        self.stats.solves += 1;
        self.last_solve = Some(SolveRecord {
            final_ms,
            raw_ms,
            moves: self.solve_log.iter().map(|s| s.face_move).collect(),
        });
        self.display.update(|d| d.elapsed_ms = final_ms);
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether the live ticker should be firing
    pub fn ticker_active(&self) -> bool {
        self.ticker_active
    }

    pub fn solve_log(&self) -> &[MoveSample] {
        &self.solve_log
    }

    pub fn last_solve(&self) -> Option<&SolveRecord> {
        self.last_solve.as_ref()
    }

    pub fn engine(&self) -> &ReconcileEngine {
        &self.engine
    }

    pub fn display(&self) -> DisplayHandle {
        self.display.clone()
    }

    pub fn stats(&self) -> &ControllerStats {
        &self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubetime_core::{Face, Turn};
    use cubetime_time::ManualClock;
    use proptest::prelude::*;
    use std::time::Duration;

    fn mv(device: u32) -> CubeEvent {
        CubeEvent::Move(MoveEvent::new(FaceMove::new(Face::R, Turn::Clockwise), device))
    }

    fn connected() -> (ManualClock, TimerController<ManualClock>) {
        let clock = ManualClock::starting_at(HostTime::from_millis(10_000));
        let mut controller = TimerController::new(clock.clone());
        controller.handle_event(CubeEvent::Connect);
        (clock, controller)
    }

    #[test]
    fn test_activate_requires_connection() {
        let mut controller = TimerController::new(ManualClock::new());
        controller.activate();
        assert_eq!(controller.state(), TimerState::Idle);
        assert_eq!(controller.stats().ignored_inputs, 1);

        controller.handle_event(CubeEvent::Connect);
        controller.activate();
        assert_eq!(controller.state(), TimerState::Ready);

        let display = controller.display().snapshot();
        assert!(display.visible);
        assert_eq!(display.elapsed_text(), "0:00.000");
    }

    #[test]
    fn test_activate_after_disconnect_ignored() {
        let (_clock, mut controller) = connected();
        controller.handle_event(CubeEvent::Disconnect);

        controller.activate();
        assert_eq!(controller.state(), TimerState::Idle);
        assert!(!controller.display().snapshot().visible);
    }

    #[test]
    fn test_full_solve_reports_fitted_time() {
        let (clock, mut controller) = connected();
        controller.activate();

        // Three moves at 0, 500, 1230ms on both clocks
        controller.handle_event(mv(3_000));
        assert_eq!(controller.state(), TimerState::Running);
        assert!(controller.ticker_active());

        clock.advance(Duration::from_millis(500));
        controller.handle_event(mv(3_500));
        clock.advance(Duration::from_millis(730));
        controller.handle_event(mv(4_230));
        assert_eq!(controller.solve_log().len(), 3);

        controller.on_pattern(true);
        assert_eq!(controller.state(), TimerState::Stopped);
        assert!(!controller.ticker_active());

        let display = controller.display().snapshot();
        assert_eq!(display.elapsed_text(), "0:01.230");
        assert_eq!(display.color(), Some("#fff"));
        assert_eq!(controller.last_solve().map(|s| s.final_ms), Some(1_230));
    }

    #[test]
    fn test_final_time_ignores_arrival_jitter() {
        let (clock, mut controller) = connected();
        controller.activate();

        // Device reports steady 200ms spacing; one arrival is 60ms late
        let delays = [0u64, 200, 200, 260, 140, 200, 200];
        for (i, delay) in delays.iter().enumerate() {
            clock.advance(Duration::from_millis(*delay));
            controller.handle_event(mv(i as u32 * 200));
        }
        controller.on_pattern(true);

        let solve = controller.last_solve().cloned().unwrap();
        assert_eq!(solve.raw_ms, 1_200);
        assert_eq!(solve.final_ms, 1_200);
        assert_eq!(solve.moves.len(), 7);
    }

    #[test]
    fn test_ticker_updates_elapsed_only_while_running() {
        let (clock, mut controller) = connected();
        controller.activate();
        controller.tick();
        assert_eq!(controller.stats().ticks, 0);

        controller.handle_event(mv(0));
        clock.advance(Duration::from_millis(90));
        controller.tick();
        assert_eq!(controller.display().snapshot().elapsed_ms, 90);

        controller.on_pattern(true);
        let stopped = controller.display().snapshot().elapsed_ms;
        clock.advance(Duration::from_millis(500));
        controller.tick();
        assert_eq!(controller.display().snapshot().elapsed_ms, stopped);
        assert_eq!(controller.stats().ticks, 1);
    }

    #[test]
    fn test_disconnect_mid_solve_discards() {
        let (_clock, mut controller) = connected();
        controller.activate();
        controller.handle_event(mv(0));
        controller.handle_event(mv(100));

        controller.handle_event(CubeEvent::Disconnect);
        assert_eq!(controller.state(), TimerState::Idle);
        assert!(controller.solve_log().is_empty());
        assert!(controller.last_solve().is_none());
        assert!(!controller.ticker_active());
        assert!(controller.engine().window().is_empty());
        assert_eq!(controller.stats().discarded_solves, 1);

        // No connection, activation is ignored
        controller.activate();
        assert_eq!(controller.state(), TimerState::Idle);
    }

    #[test]
    fn test_stopped_activate_cycle() {
        let (_clock, mut controller) = connected();
        controller.activate();
        controller.handle_event(mv(0));
        controller.on_pattern(true);

        controller.activate();
        assert_eq!(controller.state(), TimerState::Idle);
        assert!(!controller.display().snapshot().visible);

        controller.activate();
        assert_eq!(controller.state(), TimerState::Ready);
        controller.handle_event(mv(50));
        assert_eq!(controller.solve_log().len(), 1);
    }

    #[test]
    fn test_skew_published_after_ten_moves() {
        let (clock, mut controller) = connected();
        for i in 0..9u32 {
            controller.handle_event(mv(i * 100));
            clock.advance(Duration::from_millis(105));
        }
        assert!(controller.display().snapshot().skew.is_none());

        controller.handle_event(mv(900));
        let text = controller.display().snapshot().skew_text().unwrap();
        assert_eq!(text, "5.000%");
    }

    #[test]
    fn test_moves_outside_running_not_logged() {
        let (_clock, mut controller) = connected();
        controller.handle_event(mv(0));
        assert_eq!(controller.state(), TimerState::Idle);
        assert!(controller.solve_log().is_empty());
        assert_eq!(controller.engine().window().len(), 1);
    }

    fn input_strategy() -> impl Strategy<Value = u8> {
        0u8..6
    }

    proptest! {
        #[test]
        fn prop_ticker_active_only_while_running(inputs in prop::collection::vec(input_strategy(), 0..80)) {
            let clock = ManualClock::new();
            let mut controller = TimerController::new(clock.clone());
            for (i, input) in inputs.iter().enumerate() {
                clock.advance(Duration::from_millis(37));
                match input {
                    0 => controller.handle_event(CubeEvent::Connect),
                    1 => controller.handle_event(CubeEvent::Disconnect),
                    2 => controller.handle_event(mv(i as u32 * 37)),
                    3 => controller.on_pattern(true),
                    4 => controller.activate(),
                    _ => controller.tick(),
                }
                prop_assert_eq!(controller.ticker_active(), controller.state() == TimerState::Running);
                prop_assert_eq!(controller.display().snapshot().timer_state, controller.state());
                if controller.state() == TimerState::Idle {
                    prop_assert!(!controller.display().snapshot().visible);
                }
            }
        }
    }
}
