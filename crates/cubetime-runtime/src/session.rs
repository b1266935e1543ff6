//! Session loop - one task, inputs handled strictly in arrival order
//!
//! The loop owns the [`TimerController`] and waits on four inputs:
//! user commands, cube events, solved-pattern notifications, and the
//! live display ticker. The ticker branch is only enabled while the
//! controller is RUNNING, so no tick is delivered after leaving it.

use std::time::Duration;

use cubetime_core::{CubeEvent, CubeResult, CubeTimeError};
use cubetime_time::HostClock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::{DisplayHandle, EventSource, PatternObserver, TimerController};

/// Session configuration
#[derive(Clone, Debug)]
pub struct TimerConfig {
    /// Live display refresh interval while RUNNING
    pub tick_interval: Duration,
    /// Buffered user commands
    pub command_buffer: usize,
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig {
            tick_interval: Duration::from_millis(30),
            command_buffer: 16,
        }
    }
}

/// User-side input to a running session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    /// Activation gesture (key press, touch)
    Activate,
    /// Reset gesture
    Reset,
    /// Stop the session loop
    Shutdown,
}

/// Handle for driving a spawned session
#[derive(Clone, Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    display: DisplayHandle,
}

impl SessionHandle {
    pub async fn activate(&self) -> CubeResult<()> {
        self.send(SessionCommand::Activate).await
    }

    pub async fn reset(&self) -> CubeResult<()> {
        self.send(SessionCommand::Reset).await
    }

    pub async fn shutdown(&self) -> CubeResult<()> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, command: SessionCommand) -> CubeResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CubeTimeError::ChannelClosed)
    }

    pub fn display(&self) -> &DisplayHandle {
        &self.display
    }
}

/// Drive `controller` until shutdown or until the command channel closes.
/// Returns the controller for inspection.
///
/// An ended event source counts as a disconnect.
pub async fn run_session<C, E, P>(
    mut controller: TimerController<C>,
    mut events: E,
    mut pattern: P,
    mut commands: mpsc::Receiver<SessionCommand>,
    config: TimerConfig,
) -> TimerController<C>
where
    C: HostClock,
    E: EventSource,
    P: PatternObserver,
{
    let mut ticker = time::interval(config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut events_open = true;
    let mut pattern_open = true;
    let mut was_running = false;

    loop {
        let running = controller.ticker_active();
        if running && !was_running {
            // First tick one interval after entering RUNNING
            ticker.reset();
        }
        was_running = running;

        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(SessionCommand::Activate) => controller.activate(),
                Some(SessionCommand::Reset) => controller.reset(),
                Some(SessionCommand::Shutdown) | None => break,
            },

            event = events.next_event(), if events_open => match event {
                Some(event) => controller.handle_event(event),
                None => {
                    tracing::info!("event source ended");
                    events_open = false;
                    controller.handle_event(CubeEvent::Disconnect);
                }
            },

            solved = pattern.next_solved(), if pattern_open => match solved {
                Some(solved) => controller.on_pattern(solved),
                None => {
                    tracing::debug!("pattern observer ended");
                    pattern_open = false;
                }
            },

            _ = ticker.tick(), if running => controller.tick(),
        }
    }

    tracing::info!(state = %controller.state(), "session stopped");
    controller
}

/// Spawn a session on the current tokio runtime
pub fn spawn_session<C, E, P>(
    controller: TimerController<C>,
    events: E,
    pattern: P,
    config: TimerConfig,
) -> (SessionHandle, JoinHandle<TimerController<C>>)
where
    C: HostClock + Send + 'static,
    E: EventSource + 'static,
    P: PatternObserver + 'static,
{
    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
    let handle = SessionHandle {
        commands: tx,
        display: controller.display(),
    };
    let task = tokio::spawn(run_session(controller, events, pattern, rx, config));
    (handle, task)
}
