//! Face-turn moves
//!
//! A face move is one of 18 discrete rotations: six faces, each turned
//! clockwise, twice, or counter-clockwise.

use std::fmt;
use std::str::FromStr;

use crate::{CubeResult, CubeTimeError};

/// Cube face, in device order (U R F D L B)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    U = 0,
    R = 1,
    F = 2,
    D = 3,
    L = 4,
    B = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    pub fn from_byte(b: u8) -> Option<Self> {
        Self::ALL.get(b as usize).copied()
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'U' => Some(Face::U),
            'R' => Some(Face::R),
            'F' => Some(Face::F),
            'D' => Some(Face::D),
            'L' => Some(Face::L),
            'B' => Some(Face::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }
}

/// Turn amount
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Turn {
    Clockwise = 0,
    Double = 1,
    CounterClockwise = 2,
}

impl Turn {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Turn::Clockwise),
            1 => Some(Turn::Double),
            2 => Some(Turn::CounterClockwise),
            _ => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Turn::Clockwise => "",
            Turn::Double => "2",
            Turn::CounterClockwise => "'",
        }
    }
}

/// A single face turn
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceMove {
    pub face: Face,
    pub turn: Turn,
}

impl FaceMove {
    /// Number of distinct face moves
    pub const COUNT: u8 = 18;

    #[inline]
    pub fn new(face: Face, turn: Turn) -> Self {
        FaceMove { face, turn }
    }

    /// Dense index in `0..18` (face * 3 + turn)
    #[inline]
    pub fn index(self) -> u8 {
        self.face.to_byte() * 3 + self.turn as u8
    }

    pub fn from_index(index: u8) -> CubeResult<Self> {
        let face = Face::from_byte(index / 3).ok_or(CubeTimeError::UnknownMove(index))?;
        let turn = Turn::from_byte(index % 3).ok_or(CubeTimeError::UnknownMove(index))?;
        Ok(FaceMove { face, turn })
    }

    /// The move that undoes this one
    pub fn inverse(self) -> Self {
        let turn = match self.turn {
            Turn::Clockwise => Turn::CounterClockwise,
            Turn::Double => Turn::Double,
            Turn::CounterClockwise => Turn::Clockwise,
        };
        FaceMove { face: self.face, turn }
    }
}

impl fmt::Debug for FaceMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self)
    }
}

impl fmt::Display for FaceMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.face.as_char(), self.turn.suffix())
    }
}

impl FromStr for FaceMove {
    type Err = CubeTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CubeTimeError::InvalidNotation(s.to_string());
        let mut chars = s.trim().chars();
        let face = chars.next().and_then(Face::from_char).ok_or_else(invalid)?;
        let turn = match chars.as_str() {
            "" => Turn::Clockwise,
            "2" | "2'" => Turn::Double,
            "'" => Turn::CounterClockwise,
            _ => return Err(invalid()),
        };
        Ok(FaceMove { face, turn })
    }
}

/// Parse a whitespace separated move sequence such as `"R U R' U'"`
pub fn parse_moves(alg: &str) -> CubeResult<Vec<FaceMove>> {
    alg.split_whitespace().map(str::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_covers_all_moves() {
        for i in 0..FaceMove::COUNT {
            let m = FaceMove::from_index(i).unwrap();
            assert_eq!(m.index(), i);
        }
        assert_eq!(FaceMove::from_index(18), Err(CubeTimeError::UnknownMove(18)));
    }

    #[test]
    fn test_notation() {
        let m: FaceMove = "R'".parse().unwrap();
        assert_eq!(m, FaceMove::new(Face::R, Turn::CounterClockwise));
        assert_eq!(m.to_string(), "R'");
        assert_eq!("U2".parse::<FaceMove>().unwrap().turn, Turn::Double);
        assert!("X".parse::<FaceMove>().is_err());
        assert!("R3".parse::<FaceMove>().is_err());
    }

    #[test]
    fn test_parse_sequence_and_inverse() {
        let moves = parse_moves("R U R' U'").unwrap();
        assert_eq!(moves.len(), 4);
        assert_eq!(moves[0].inverse(), moves[2]);
        assert_eq!(moves[1].inverse(), moves[3]);
    }
}
