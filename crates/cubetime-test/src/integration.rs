//! End-to-end Integration Test Suite
//!
//! Runs simulated solves through a spawned session:
//! - Moves replayed at their simulated arrival times
//! - Solved notifications through the pattern observer
//! - Live ticker and final reconciled time on the display

use std::time::Duration;

use cubetime_core::{CubeEvent, CubeResult, CubeTimeError, FaceMove};
use cubetime_runtime::{
    spawn_session, ChannelEventSource, ChannelPatternObserver, ControllerStats, DisplayHandle,
    DisplayState, TimerConfig, TimerController, TimerState, TokioClock,
};
use cubetime_time::ReconcileConfig;
use tokio::sync::mpsc;

use crate::time_simulator::{move_sequence, ClockDriftModel, SimulatedCube, SimulatedMove, TransportModel};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Session test configuration
#[derive(Clone, Debug)]
pub struct SessionTestConfig {
    pub moves: usize,
    pub drift: ClockDriftModel,
    pub transport: TransportModel,
    pub wrap_period: u64,
    /// Pause between turns
    pub gap: Duration,
    pub seed: u64,
}

impl Default for SessionTestConfig {
    fn default() -> Self {
        Self {
            moves: 40,
            drift: ClockDriftModel::perfect(),
            transport: TransportModel::typical(),
            wrap_period: cubetime_core::FULL_COUNTER_PERIOD,
            gap: Duration::from_millis(250),
            seed: 42,
        }
    }
}

impl SessionTestConfig {
    /// Few moves, perfect link
    pub fn minimal() -> Self {
        Self {
            moves: 12,
            transport: TransportModel::ideal(),
            ..Default::default()
        }
    }

    pub fn standard() -> Self {
        Self::default()
    }

    /// Long solve, drifting clock, congested link
    pub fn stress() -> Self {
        Self {
            moves: 150,
            drift: ClockDriftModel::fast(),
            transport: TransportModel::congested(),
            gap: Duration::from_millis(180),
            ..Default::default()
        }
    }

    pub fn with_wrap_period(mut self, period: u64) -> Self {
        self.wrap_period = period;
        self
    }

    fn cube(&self) -> SimulatedCube {
        SimulatedCube::new(self.drift.clone(), self.transport.clone(), self.seed)
            .with_wrap_period(self.wrap_period)
    }
}

/// Session test result
#[derive(Clone, Debug)]
pub struct SessionTestResult {
    /// Physical time from first to last turn
    pub true_ms: u64,
    pub final_ms: Option<u64>,
    pub raw_ms: Option<u64>,
    pub display: DisplayState,
    pub stats: ControllerStats,
}

impl SessionTestResult {
    /// Whether the solve was recorded within `tolerance_ms`
    pub fn passed(&self, tolerance_ms: u64) -> bool {
        self.display.timer_state == TimerState::Stopped
            && self
                .final_ms
                .is_some_and(|f| f.abs_diff(self.true_ms) <= tolerance_ms)
    }
}

// ============================================================================
// DRIVERS
// ============================================================================

/// Generate the turns of one solve
pub fn simulate_turns(cube: &mut SimulatedCube, moves: &[FaceMove], gap: Duration) -> Vec<SimulatedMove> {
    // Inspection before the first turn
    cube.idle(Duration::from_secs(1));
    moves.iter().map(|m| cube.turn(*m, gap)).collect()
}

/// Send each move when the session clock reaches its arrival time
pub async fn replay_moves(
    moves: &[SimulatedMove],
    clock: &TokioClock,
    events: &mpsc::Sender<CubeEvent>,
) -> CubeResult<()> {
    for m in moves {
        tokio::time::sleep_until(clock.instant_at(m.arrival)).await;
        events
            .send(CubeEvent::Move(m.event))
            .await
            .map_err(|_| CubeTimeError::ChannelClosed)?;
    }
    Ok(())
}

/// Wait until the display shows `state`. Gives up after `attempts` polls.
pub async fn wait_for_state(display: &DisplayHandle, state: TimerState, attempts: usize) -> bool {
    for _ in 0..attempts {
        if display.snapshot().timer_state == state {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    display.snapshot().timer_state == state
}

/// Run one complete solve through a spawned session.
///
/// The device is connected before the session starts.
pub async fn run_session_test(config: &SessionTestConfig) -> CubeResult<SessionTestResult> {
    let clock = TokioClock::new();
    let reconcile = ReconcileConfig::default().with_wrap_period(config.wrap_period);
    let mut controller = TimerController::with_config(clock, reconcile);
    controller.handle_event(CubeEvent::Connect);

    let (event_tx, events) = ChannelEventSource::new(64);
    let (solved_tx, pattern) = ChannelPatternObserver::new(4);
    let (handle, task) = spawn_session(controller, events, pattern, TimerConfig::default());

    handle.activate().await?;
    if !wait_for_state(handle.display(), TimerState::Ready, 100).await {
        tracing::warn!("timer never became ready");
    }

    let mut cube = config.cube();
    let turns = simulate_turns(&mut cube, &move_sequence(config.moves), config.gap);
    replay_moves(&turns, &clock, &event_tx).await?;

    solved_tx
        .send(true)
        .await
        .map_err(|_| CubeTimeError::ChannelClosed)?;
    wait_for_state(handle.display(), TimerState::Stopped, 100).await;

    let display = handle.display().snapshot();
    handle.shutdown().await?;
    let controller = task.await.map_err(|_| CubeTimeError::ChannelClosed)?;

    let true_ms = match (turns.first(), turns.last()) {
        (Some(first), Some(last)) => last.turned_at.millis_since(first.turned_at),
        _ => 0,
    };
    Ok(SessionTestResult {
        true_ms,
        final_ms: controller.last_solve().map(|s| s.final_ms),
        raw_ms: controller.last_solve().map(|s| s.raw_ms),
        display,
        stats: controller.stats().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubetime_core::{Facelets, SOLVED_FACELETS};
    use cubetime_runtime::{FaceletPatternObserver, NeverSolved, ScriptedEventSource};
    use cubetime_time::ManualClock;

    #[tokio::test(start_paused = true)]
    async fn test_minimal_session() {
        let result = run_session_test(&SessionTestConfig::minimal()).await.unwrap();

        println!("Minimal session: {result:?}");
        assert!(result.passed(0));
        assert_eq!(result.display.elapsed_ms, result.true_ms);
        assert_eq!(result.stats.solves, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_standard_session() {
        let result = run_session_test(&SessionTestConfig::standard()).await.unwrap();

        assert!(result.passed(40), "{result:?}");
        assert_eq!(result.display.color(), Some("#fff"));
        // Roughly one tick per 30ms while running
        assert!(result.stats.ticks >= result.true_ms / 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stress_session() {
        let result = run_session_test(&SessionTestConfig::stress()).await.unwrap();

        println!(
            "Stress session - true {}ms, final {:?}, raw {:?}, skew {:?}",
            result.true_ms,
            result.final_ms,
            result.raw_ms,
            result.display.skew_text()
        );
        assert!(result.passed(50), "{result:?}");
        assert!(result.display.skew.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_across_counter_wrap() {
        let config = SessionTestConfig {
            drift: ClockDriftModel::new(1.0, 63_000),
            transport: TransportModel::ideal(),
            ..SessionTestConfig::minimal()
        }
        .with_wrap_period(1 << 16);
        let result = run_session_test(&config).await.unwrap();

        assert!(result.passed(1), "{result:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_facelet_observer_session() {
        let clock = TokioClock::new();
        let mut controller = TimerController::new(clock);
        controller.handle_event(CubeEvent::Connect);

        let (event_tx, events) = ChannelEventSource::new(16);
        let (facelet_tx, pattern) = FaceletPatternObserver::new(4);
        let (handle, task) = spawn_session(controller, events, pattern, TimerConfig::default());

        handle.activate().await.unwrap();
        assert!(wait_for_state(handle.display(), TimerState::Ready, 100).await);

        let mut cube = SimulatedCube::new(ClockDriftModel::perfect(), TransportModel::ideal(), 7);
        let turns = simulate_turns(&mut cube, &move_sequence(8), Duration::from_millis(300));
        replay_moves(&turns, &clock, &event_tx).await.unwrap();

        // Not solved yet
        let scrambled: Facelets = SOLVED_FACELETS.replacen('R', "L", 1).parse().unwrap();
        facelet_tx.send(scrambled).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(handle.display().snapshot().timer_state, TimerState::Running);

        facelet_tx.send(Facelets::solved()).await.unwrap();
        assert!(wait_for_state(handle.display(), TimerState::Stopped, 100).await);
        assert_eq!(handle.display().snapshot().elapsed_text(), "0:02.100");

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_lost_mid_solve() {
        let clock = TokioClock::new();
        let mut controller = TimerController::new(clock);
        controller.handle_event(CubeEvent::Connect);

        let (event_tx, events) = ChannelEventSource::new(16);
        let (handle, task) = spawn_session(controller, events, NeverSolved, TimerConfig::default());
        handle.activate().await.unwrap();
        assert!(wait_for_state(handle.display(), TimerState::Ready, 100).await);

        let mut cube = SimulatedCube::new(ClockDriftModel::perfect(), TransportModel::typical(), 11);
        let turns = simulate_turns(&mut cube, &move_sequence(20), Duration::from_millis(200));
        replay_moves(&turns[..10], &clock, &event_tx).await.unwrap();
        assert!(wait_for_state(handle.display(), TimerState::Running, 100).await);

        drop(event_tx);
        assert!(wait_for_state(handle.display(), TimerState::Idle, 100).await);
        let display = handle.display().snapshot();
        assert!(!display.visible);
        assert_eq!(display.skew, None);

        handle.shutdown().await.unwrap();
        let controller = task.await.unwrap();
        assert_eq!(controller.stats().discarded_solves, 1);
        assert!(controller.last_solve().is_none());
    }

    #[tokio::test]
    async fn test_scripted_source_end_discards_solve() {
        let mut controller = TimerController::new(ManualClock::new());
        controller.handle_event(CubeEvent::Connect);
        controller.activate();

        let turns = simulate_turns(
            &mut SimulatedCube::new(ClockDriftModel::perfect(), TransportModel::ideal(), 3),
            &move_sequence(5),
            Duration::from_millis(100),
        );
        let script = ScriptedEventSource::new(turns.iter().map(|m| CubeEvent::Move(m.event)));
        let (handle, task) = spawn_session(controller, script, NeverSolved, TimerConfig::default());

        assert!(wait_for_state(handle.display(), TimerState::Idle, 1_000).await);
        handle.shutdown().await.unwrap();

        let controller = task.await.unwrap();
        assert_eq!(controller.stats().moves, 5);
        assert_eq!(controller.stats().discarded_solves, 1);
        assert!(!controller.is_connected());
    }
}
