//! Time primitives for cubetime
//!
//! Two clocks are involved in every move:
//! - HostTime: monotonic host milliseconds, stamped on arrival
//! - DeviceTimestamp: the cube's own counter, which drifts and wraps

use std::ops::{Add, Sub};
use std::time::Duration;

/// Period of a full 32-bit device counter
pub const FULL_COUNTER_PERIOD: u64 = 1 << 32;

/// Host time - monotonic milliseconds since an arbitrary origin
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    pub const ZERO: HostTime = HostTime(0);

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        HostTime(millis)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is later
    #[inline]
    pub fn millis_since(self, earlier: HostTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        HostTime(self.0.saturating_add(duration.as_millis() as u64))
    }
}

impl Add<Duration> for HostTime {
    type Output = HostTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        HostTime(self.0 + rhs.as_millis() as u64)
    }
}

impl Sub<HostTime> for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: HostTime) -> Self::Output {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

impl std::fmt::Debug for HostTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "host({}ms)", self.0)
    }
}

/// Device timestamp - raw reading of a fixed-width counter that wraps
/// every `period` units.
///
/// INVARIANT: `raw < period`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceTimestamp {
    raw: u32,
    period: u64,
}

impl DeviceTimestamp {
    /// Create a timestamp for a counter wrapping at `period`.
    /// A zero period is treated as the full 32-bit counter.
    pub fn new(raw: u32, period: u64) -> Self {
        let period = if period == 0 || period > FULL_COUNTER_PERIOD {
            FULL_COUNTER_PERIOD
        } else {
            period
        };
        DeviceTimestamp {
            raw: (u64::from(raw) % period) as u32,
            period,
        }
    }

    /// Timestamp of a full 32-bit counter
    #[inline]
    pub fn full(raw: u32) -> Self {
        Self::new(raw, FULL_COUNTER_PERIOD)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.raw
    }

    #[inline]
    pub fn period(self) -> u64 {
        self.period
    }

    /// Place this reading on the unbounded timeline of `previous`.
    ///
    /// A reading that falls more than half a period behind `previous`
    /// has wrapped and is moved one period forward. A reading more than
    /// half a period ahead is a late sample from before the last wrap and
    /// is moved one period back.
    pub fn unwrap_relative_to(self, previous: u64) -> u64 {
        let half = self.period / 2;
        let base = previous - previous % self.period;
        let candidate = base + u64::from(self.raw);

        if candidate + half < previous {
            candidate + self.period
        } else if candidate > previous + half && candidate >= self.period {
            candidate - self.period
        } else {
            candidate
        }
    }
}

impl std::fmt::Debug for DeviceTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dev({}/{})", self.raw, self.period)
    }
}
