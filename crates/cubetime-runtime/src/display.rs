//! Display boundary
//!
//! The runtime never renders anything. It publishes a [`DisplayState`]
//! that the UI layer reads through a [`DisplayHandle`].

use std::sync::Arc;

use cubetime_time::SkewResult;
use parking_lot::RwLock;

use crate::TimerState;

/// Minutes, seconds and milliseconds of an elapsed time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElapsedTime {
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
}

impl ElapsedTime {
    pub fn from_millis(ms: u64) -> Self {
        ElapsedTime {
            minutes: ms / 60_000,
            seconds: (ms / 1_000) % 60,
            milliseconds: ms % 1_000,
        }
    }
}

impl std::fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02}.{:03}", self.minutes, self.seconds, self.milliseconds)
    }
}

/// Format milliseconds as `m:ss.mmm`
pub fn format_elapsed(ms: u64) -> String {
    ElapsedTime::from_millis(ms).to_string()
}

/// What the display layer shows
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayState {
    pub timer_state: TimerState,
    /// Whether the timer is shown at all
    pub visible: bool,
    /// Elapsed value: live while running, final once stopped
    pub elapsed_ms: u64,
    /// Current skew, once the window holds enough samples
    pub skew: Option<SkewResult>,
}

impl DisplayState {
    pub fn elapsed_text(&self) -> String {
        format_elapsed(self.elapsed_ms)
    }

    pub fn skew_text(&self) -> Option<String> {
        self.skew.map(|s| s.to_string())
    }

    pub fn color(&self) -> Option<&'static str> {
        self.timer_state.color()
    }
}

/// Shared, read-mostly display state
#[derive(Clone, Debug, Default)]
pub struct DisplayHandle {
    inner: Arc<RwLock<DisplayState>>,
}

impl DisplayHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current display state
    pub fn snapshot(&self) -> DisplayState {
        self.inner.read().clone()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut DisplayState)) {
        f(&mut self.inner.write());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0:00.000");
        assert_eq!(format_elapsed(1_230), "0:01.230");
        assert_eq!(format_elapsed(61_005), "1:01.005");
        assert_eq!(format_elapsed(12 * 60_000 + 59_999), "12:59.999");
    }

    #[test]
    fn test_handle_shared() {
        let handle = DisplayHandle::new();
        let reader = handle.clone();
        handle.update(|d| {
            d.visible = true;
            d.elapsed_ms = 500;
        });

        let snap = reader.snapshot();
        assert!(snap.visible);
        assert_eq!(snap.elapsed_text(), "0:00.500");
        assert_eq!(snap.skew_text(), None);
    }

    #[test]
    fn test_skew_text() {
        let state = DisplayState {
            skew: Some(SkewResult { skew_percent: 4.99907, samples: 20 }),
            ..DisplayState::default()
        };
        assert_eq!(state.skew_text().as_deref(), Some("4.999%"));
    }
}
