//! Move samples - a face move paired with both clocks' view of it

use crate::{DeviceTimestamp, FaceMove, HostTime};

/// One recorded move. Immutable once recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveSample {
    pub face_move: FaceMove,
    /// Device clock reading (ms units, wraps)
    pub device_timestamp: DeviceTimestamp,
    /// Host arrival time
    pub host_arrival: HostTime,
}

impl MoveSample {
    pub fn new(face_move: FaceMove, device_timestamp: DeviceTimestamp, host_arrival: HostTime) -> Self {
        MoveSample {
            face_move,
            device_timestamp,
            host_arrival,
        }
    }
}

/// Unwrap the device timestamps of an ordered sample sequence onto one
/// unbounded timeline, starting from the first sample's raw value.
pub fn unwrap_device_series(samples: &[MoveSample]) -> Vec<u64> {
    let mut out = Vec::with_capacity(samples.len());
    let mut previous: Option<u64> = None;
    for sample in samples {
        let ts = sample.device_timestamp;
        let unwrapped = match previous {
            Some(prev) => ts.unwrap_relative_to(prev),
            None => u64::from(ts.raw()),
        };
        out.push(unwrapped);
        previous = Some(unwrapped);
    }
    out
}
