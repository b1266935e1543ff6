//! Error types for cubetime

use thiserror::Error;

/// Core cubetime errors
///
/// Expected runtime conditions (too few samples, ignored activations,
/// a disconnect mid-solve) are not errors and never show up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubeTimeError {
    // Codec errors
    #[error("Unknown move index: {0}")]
    UnknownMove(u8),

    #[error("Invalid move notation: {0:?}")]
    InvalidNotation(String),

    #[error("Invalid facelets: expected {expected} stickers, got {actual}")]
    FaceletCount { expected: usize, actual: usize },

    #[error("Invalid facelet {0:?}")]
    InvalidFacelet(char),

    // Runtime errors
    #[error("Session channel closed")]
    ChannelClosed,

    #[error("Logging initialisation failed: {0}")]
    Logging(String),
}

/// Result type for cubetime operations
pub type CubeResult<T> = Result<T, CubeTimeError>;
