//! Solve timer state machine
//!
//! IDLE -> READY -> RUNNING -> STOPPED -> IDLE, plus a forced return to
//! IDLE on disconnect or reset. [`transition`] is pure: it decides the
//! next state and the side effects, the controller carries them out.

use std::fmt;

/// Timer state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Ready,
    Running,
    Stopped,
}

impl TimerState {
    pub const ALL: [TimerState; 4] = [
        TimerState::Idle,
        TimerState::Ready,
        TimerState::Running,
        TimerState::Stopped,
    ];

    /// Display colour hint; `None` while the timer is hidden
    pub fn color(self) -> Option<&'static str> {
        match self {
            TimerState::Idle => None,
            TimerState::Ready => Some("#0f0"),
            TimerState::Running => Some("#999"),
            TimerState::Stopped => Some("#fff"),
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerState::Idle => "IDLE",
            TimerState::Ready => "READY",
            TimerState::Running => "RUNNING",
            TimerState::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

/// Input to the timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerInput {
    /// User activation gesture, with whether a device is connected
    Activate { connected: bool },
    /// A move was observed
    Move,
    /// The puzzle reached the solved pattern
    Solved,
    /// The device disconnected
    Disconnect,
    /// Manual reset
    Reset,
}

/// Side effect requested by a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEffect {
    /// Show the timer at 0:00.000
    ResetDisplay,
    /// Start a new solve-move log
    ClearSolveLog,
    StartTicker,
    StopTicker,
    /// Fit the solve log and publish the final time
    RecordFinalTime,
    /// Drop the in-flight solve
    DiscardSolve,
    HideTimer,
}

/// Result of applying one input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: TimerState,
    pub effects: Vec<TimerEffect>,
}

impl Transition {
    fn stay(state: TimerState) -> Self {
        Transition {
            state,
            effects: Vec::new(),
        }
    }

    fn to(state: TimerState, effects: Vec<TimerEffect>) -> Self {
        Transition { state, effects }
    }

    /// True when the input changed nothing
    pub fn is_noop(&self, from: TimerState) -> bool {
        self.state == from && self.effects.is_empty()
    }
}

/// Compute the next state and its side effects.
pub fn transition(state: TimerState, input: TimerInput) -> Transition {
    use TimerEffect::*;
    use TimerState::*;

    match (state, input) {
        (Idle, TimerInput::Activate { connected: true }) => Transition::to(Ready, vec![ResetDisplay]),
        (Idle, _) => Transition::stay(Idle),

        (Ready, TimerInput::Move) => Transition::to(Running, vec![ClearSolveLog, StartTicker]),
        (Ready, TimerInput::Activate { .. } | TimerInput::Disconnect | TimerInput::Reset) => {
            Transition::to(Idle, vec![StopTicker, HideTimer])
        }
        (Ready, TimerInput::Solved) => Transition::stay(Ready),

        (Running, TimerInput::Solved) => Transition::to(Stopped, vec![StopTicker, RecordFinalTime]),
        (Running, TimerInput::Activate { .. } | TimerInput::Disconnect | TimerInput::Reset) => {
            Transition::to(Idle, vec![StopTicker, DiscardSolve, HideTimer])
        }
        (Running, TimerInput::Move) => Transition::stay(Running),

        (Stopped, TimerInput::Activate { .. } | TimerInput::Disconnect | TimerInput::Reset) => {
            Transition::to(Idle, vec![StopTicker, HideTimer])
        }
        (Stopped, TimerInput::Move | TimerInput::Solved) => Transition::stay(Stopped),
    }
}
