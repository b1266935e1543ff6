//! Host clock on the tokio timer, so paused-time tests see the same
//! time as the session's ticker.

use cubetime_core::HostTime;
use cubetime_time::HostClock;
use tokio::time::Instant;

/// Clock reading `tokio::time::Instant`, zero at construction
#[derive(Clone, Copy, Debug)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        TokioClock {
            origin: Instant::now(),
        }
    }

    /// Instant corresponding to `HostTime::ZERO`
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Instant corresponding to `time`
    pub fn instant_at(&self, time: HostTime) -> Instant {
        self.origin + std::time::Duration::from_millis(time.as_millis())
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock for TokioClock {
    fn now(&self) -> HostTime {
        HostTime::from_millis(self.origin.elapsed().as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_follows_paused_time() {
        let clock = TokioClock::new();
        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(clock.now(), HostTime::from_millis(250));

        tokio::time::sleep_until(clock.instant_at(HostTime::from_millis(400))).await;
        assert_eq!(clock.now(), HostTime::from_millis(400));
    }
}
