//! Rolling window of recent move samples

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;

use cubetime_core::{HostTime, MoveSample};
use parking_lot::Mutex;

/// Default number of samples kept for drift estimation
pub const DEFAULT_WINDOW_CAPACITY: usize = 256;

/// Bounded, append-only window of the most recent move samples.
///
/// INVARIANTS:
/// - `len() <= capacity`
/// - oldest sample first, evicted first
/// - host arrival strictly increasing
#[derive(Clone, Debug)]
pub struct MoveWindow {
    samples: VecDeque<MoveSample>,
    capacity: usize,
}

impl MoveWindow {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        MoveWindow {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting from the front once over capacity.
    /// Returns the evicted sample, if any.
    ///
    /// A sample arriving at or before the previous one is stamped one
    /// millisecond after it.
    pub fn record(&mut self, mut sample: MoveSample) -> Option<MoveSample> {
        if let Some(last) = self.samples.back() {
            if sample.host_arrival <= last.host_arrival {
                let bumped = HostTime::from_millis(last.host_arrival.as_millis() + 1);
                tracing::debug!(
                    arrival = ?sample.host_arrival,
                    previous = ?last.host_arrival,
                    "non-increasing host arrival, restamped"
                );
                sample.host_arrival = bumped;
            }
        }

        self.samples.push_back(sample);

        let mut evicted = None;
        while self.samples.len() > self.capacity {
            evicted = self.samples.pop_front();
        }
        evicted
    }

    /// Immutable copy of the current window, oldest first
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            samples: self.samples.iter().copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<&MoveSample> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&MoveSample> {
        self.samples.back()
    }

    /// Drop every sample (new connection, new device clock origin)
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for MoveWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a window taken at one instant.
/// Cheap to clone; later writes to the window never show through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowSnapshot {
    samples: Arc<[MoveSample]>,
}

impl WindowSnapshot {
    pub fn from_samples(samples: &[MoveSample]) -> Self {
        WindowSnapshot {
            samples: samples.into(),
        }
    }

    pub fn samples(&self) -> &[MoveSample] {
        &self.samples
    }
}

impl Deref for WindowSnapshot {
    type Target = [MoveSample];

    fn deref(&self) -> &[MoveSample] {
        &self.samples
    }
}

/// Window shared between a writer task and reader threads.
/// Writers go through the lock; readers only ever get snapshots.
#[derive(Clone, Debug, Default)]
pub struct SharedMoveWindow {
    inner: Arc<Mutex<MoveWindow>>,
}

impl SharedMoveWindow {
    pub fn new(window: MoveWindow) -> Self {
        SharedMoveWindow {
            inner: Arc::new(Mutex::new(window)),
        }
    }

    pub fn record(&self, sample: MoveSample) -> Option<MoveSample> {
        self.inner.lock().record(sample)
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.inner.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubetime_core::{DeviceTimestamp, Face, FaceMove, Turn};
    use proptest::prelude::*;

    fn sample(i: u64) -> MoveSample {
        MoveSample::new(
            FaceMove::new(Face::R, Turn::Clockwise),
            DeviceTimestamp::full(i as u32 * 100),
            HostTime::from_millis(i * 100),
        )
    }

    #[test]
    fn test_fifo_eviction() {
        let mut window = MoveWindow::with_capacity(3);
        for i in 0..3 {
            assert!(window.record(sample(i)).is_none());
        }

        let evicted = window.record(sample(3));
        assert_eq!(evicted, Some(sample(0)));
        assert_eq!(window.len(), 3);
        assert_eq!(window.oldest(), Some(&sample(1)));
        assert_eq!(window.newest(), Some(&sample(3)));
    }

    #[test]
    fn test_restamps_non_increasing_arrival() {
        let mut window = MoveWindow::new();
        window.record(sample(5));
        window.record(sample(5));
        window.record(sample(2));

        let snap = window.snapshot();
        assert_eq!(snap[1].host_arrival, HostTime::from_millis(501));
        assert_eq!(snap[2].host_arrival, HostTime::from_millis(502));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut window = MoveWindow::new();
        window.record(sample(0));
        let snap = window.snapshot();
        window.record(sample(1));

        assert_eq!(snap.len(), 1);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_shared_window_across_threads() {
        let shared = SharedMoveWindow::new(MoveWindow::with_capacity(8));
        let writer = shared.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..20 {
                writer.record(sample(i));
            }
        });
        handle.join().unwrap();

        let snap = shared.snapshot();
        assert_eq!(snap.len(), 8);
        assert_eq!(snap[0], sample(12));
    }

    proptest! {
        #[test]
        fn prop_window_bounded_and_fifo(count in 0usize..700, capacity in 1usize..300) {
            let mut window = MoveWindow::with_capacity(capacity);
            for i in 0..count as u64 {
                window.record(sample(i));
                prop_assert!(window.len() <= capacity);
            }

            let snap = window.snapshot();
            prop_assert_eq!(snap.len(), count.min(capacity));
            if let Some(first) = snap.first() {
                let expected_first = count.saturating_sub(capacity) as u64;
                prop_assert_eq!(*first, sample(expected_first));
            }
        }
    }
}
