//! Cube events
//!
//! The event source delivers a discriminated stream of events. Only
//! MOVE, FACELETS, CONNECT and DISCONNECT matter to the timer; the rest
//! pass through untouched.

use std::fmt;

use crate::{FaceMove, Facelets};

/// Event kind classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    Connect = 0x01,
    Disconnect = 0x02,
    Move = 0x10,
    Facelets = 0x11,
    Gyro = 0x20,
    Battery = 0x30,
    Hardware = 0x31,
}

impl EventKind {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(EventKind::Connect),
            0x02 => Some(EventKind::Disconnect),
            0x10 => Some(EventKind::Move),
            0x11 => Some(EventKind::Facelets),
            0x20 => Some(EventKind::Gyro),
            0x30 => Some(EventKind::Battery),
            0x31 => Some(EventKind::Hardware),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Connect => "CONNECT",
            EventKind::Disconnect => "DISCONNECT",
            EventKind::Move => "MOVE",
            EventKind::Facelets => "FACELETS",
            EventKind::Gyro => "GYRO",
            EventKind::Battery => "BATTERY",
            EventKind::Hardware => "HARDWARE",
        };
        f.write_str(name)
    }
}

/// A move as reported by the device.
///
/// Moves recovered from the device's history may arrive without a
/// device timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveEvent {
    pub face_move: FaceMove,
    pub device_timestamp: Option<u32>,
}

impl MoveEvent {
    pub fn new(face_move: FaceMove, device_timestamp: u32) -> Self {
        MoveEvent {
            face_move,
            device_timestamp: Some(device_timestamp),
        }
    }

    pub fn recovered(face_move: FaceMove) -> Self {
        MoveEvent {
            face_move,
            device_timestamp: None,
        }
    }
}

/// Hardware description reported once after connecting
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HardwareInfo {
    pub hardware_name: Option<String>,
    pub hardware_version: Option<String>,
    pub software_version: Option<String>,
    pub gyro_supported: bool,
}

/// Cube event
#[derive(Clone, Debug, PartialEq)]
pub enum CubeEvent {
    Connect,
    Disconnect,
    Move(MoveEvent),
    Facelets(Facelets),
    /// Orientation quaternion (x, y, z, w)
    Gyro([f32; 4]),
    Battery(u8),
    Hardware(HardwareInfo),
}

impl CubeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CubeEvent::Connect => EventKind::Connect,
            CubeEvent::Disconnect => EventKind::Disconnect,
            CubeEvent::Move(_) => EventKind::Move,
            CubeEvent::Facelets(_) => EventKind::Facelets,
            CubeEvent::Gyro(_) => EventKind::Gyro,
            CubeEvent::Battery(_) => EventKind::Battery,
            CubeEvent::Hardware(_) => EventKind::Hardware,
        }
    }
}
