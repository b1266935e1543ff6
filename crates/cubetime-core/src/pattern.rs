//! Facelet patterns
//!
//! A pattern is the 54-sticker facelet string in U R F D L B face order,
//! nine stickers per face.

use std::fmt;
use std::str::FromStr;

use crate::{CubeTimeError, Face};

/// Number of stickers on a 3x3x3 cube
pub const FACELET_COUNT: usize = 54;

/// The canonical solved configuration
pub const SOLVED_FACELETS: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

/// Validated facelet string
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Facelets(String);

impl Facelets {
    pub fn solved() -> Self {
        Facelets(SOLVED_FACELETS.to_string())
    }

    /// True when every face shows a single colour in canonical order
    pub fn is_solved(&self) -> bool {
        self.0 == SOLVED_FACELETS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stickers of one face
    pub fn face(&self, face: Face) -> &str {
        let start = face.to_byte() as usize * 9;
        &self.0[start..start + 9]
    }
}

impl FromStr for Facelets {
    type Err = CubeTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.chars().count();
        if count != FACELET_COUNT {
            return Err(CubeTimeError::FaceletCount {
                expected: FACELET_COUNT,
                actual: count,
            });
        }
        if let Some(bad) = s.chars().find(|c| Face::from_char(*c).is_none()) {
            return Err(CubeTimeError::InvalidFacelet(bad));
        }
        Ok(Facelets(s.to_string()))
    }
}

impl fmt::Debug for Facelets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Facelets({})", self.0)
    }
}

impl fmt::Display for Facelets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solved_detection() {
        assert!(Facelets::solved().is_solved());

        let scrambled: Facelets = SOLVED_FACELETS.replacen('U', "B", 1).parse().unwrap();
        assert!(!scrambled.is_solved());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            "UUU".parse::<Facelets>(),
            Err(CubeTimeError::FaceletCount { expected: 54, actual: 3 })
        );
        let bad = SOLVED_FACELETS.replacen('R', "X", 1);
        assert_eq!(bad.parse::<Facelets>(), Err(CubeTimeError::InvalidFacelet('X')));
    }

    #[test]
    fn test_face_slice() {
        let f = Facelets::solved();
        assert_eq!(f.face(Face::F), "FFFFFFFFF");
    }
}
