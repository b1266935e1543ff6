//! Host clock implementations
//!
//! Every move is stamped with host time on arrival. The timer only ever
//! reads time through [`HostClock`], so tests can drive it with a
//! [`ManualClock`] instead of the wall clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cubetime_core::HostTime;

/// Source of host time
pub trait HostClock {
    /// Current host time
    /// INVARIANT: never decreases between calls
    fn now(&self) -> HostTime;
}

/// Monotonic OS clock, zero at construction
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    reference: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            reference: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock for MonotonicClock {
    fn now(&self) -> HostTime {
        HostTime::from_millis(self.reference.elapsed().as_millis() as u64)
    }
}

/// Virtual clock advanced by hand. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: HostTime) -> Self {
        ManualClock {
            millis: Arc::new(AtomicU64::new(start.as_millis())),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, dt: Duration) -> HostTime {
        let dt = dt.as_millis() as u64;
        HostTime::from_millis(self.millis.fetch_add(dt, Ordering::SeqCst) + dt)
    }

    /// Jump to `target`. Only allowed to move forward.
    pub fn set(&self, target: HostTime) {
        self.millis.fetch_max(target.as_millis(), Ordering::SeqCst);
    }
}

impl HostClock for ManualClock {
    fn now(&self) -> HostTime {
        HostTime::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

impl<C: HostClock + ?Sized> HostClock for &C {
    fn now(&self) -> HostTime {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();

        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = clock.now();

        assert!(t2 > t1);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::starting_at(HostTime::from_millis(100));
        let view = clock.clone();

        clock.advance(Duration::from_millis(30));
        assert_eq!(view.now(), HostTime::from_millis(130));
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new();
        clock.set(HostTime::from_millis(500));
        clock.set(HostTime::from_millis(200));
        assert_eq!(clock.now(), HostTime::from_millis(500));
    }
}
