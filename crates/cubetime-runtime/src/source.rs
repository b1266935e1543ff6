//! Consumed interfaces: the cube event stream and the solved-pattern
//! notifier
//!
//! Both are pull-based. Implementations must be cancel-safe: the session
//! loop drops a pending `next_*` future whenever another input wins.

use std::collections::VecDeque;
use std::future::Future;

use cubetime_core::{CubeEvent, Facelets};
use tokio::sync::mpsc;

/// Live stream of cube events
pub trait EventSource: Send {
    /// Next event, or `None` once the source has ended
    fn next_event(&mut self) -> impl Future<Output = Option<CubeEvent>> + Send;
}

/// Notifier of puzzle pattern changes
pub trait PatternObserver: Send {
    /// Whether the puzzle is solved after its next state change,
    /// or `None` once the observer has ended
    fn next_solved(&mut self) -> impl Future<Output = Option<bool>> + Send;
}

/// Event source fed through a tokio channel
#[derive(Debug)]
pub struct ChannelEventSource {
    rx: mpsc::Receiver<CubeEvent>,
}

impl ChannelEventSource {
    pub fn new(buffer: usize) -> (mpsc::Sender<CubeEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, ChannelEventSource { rx })
    }
}

impl EventSource for ChannelEventSource {
    async fn next_event(&mut self) -> Option<CubeEvent> {
        self.rx.recv().await
    }
}

/// Pattern observer fed "is solved" flags through a tokio channel
#[derive(Debug)]
pub struct ChannelPatternObserver {
    rx: mpsc::Receiver<bool>,
}

impl ChannelPatternObserver {
    pub fn new(buffer: usize) -> (mpsc::Sender<bool>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, ChannelPatternObserver { rx })
    }
}

impl PatternObserver for ChannelPatternObserver {
    async fn next_solved(&mut self) -> Option<bool> {
        self.rx.recv().await
    }
}

/// Pattern observer fed whole facelet patterns, e.g. from a puzzle model
/// that replays moves
#[derive(Debug)]
pub struct FaceletPatternObserver {
    rx: mpsc::Receiver<Facelets>,
}

impl FaceletPatternObserver {
    pub fn new(buffer: usize) -> (mpsc::Sender<Facelets>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, FaceletPatternObserver { rx })
    }
}

impl PatternObserver for FaceletPatternObserver {
    async fn next_solved(&mut self) -> Option<bool> {
        self.rx.recv().await.map(|f| f.is_solved())
    }
}

/// Event source replaying a fixed script, then ending
#[derive(Clone, Debug, Default)]
pub struct ScriptedEventSource {
    events: VecDeque<CubeEvent>,
}

impl ScriptedEventSource {
    pub fn new(events: impl IntoIterator<Item = CubeEvent>) -> Self {
        ScriptedEventSource {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ScriptedEventSource {
    async fn next_event(&mut self) -> Option<CubeEvent> {
        self.events.pop_front()
    }
}

/// Observer that never reports anything
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverSolved;

impl PatternObserver for NeverSolved {
    async fn next_solved(&mut self) -> Option<bool> {
        std::future::pending().await
    }
}
