//! Precondition errors
//!
//! Only constructors and `World` entry points are fallible. The per-tick
//! collision and integration paths rely on the checks made here.

use thiserror::Error;

/// Errors raised when a caller hands the engine an impossible configuration
#[derive(Debug, Error)]
pub enum Error {
    #[error("grid must be at least 3x3 to have an interior cell, got {width}x{height}")]
    GridTooSmall { width: usize, height: usize },

    #[error("body mass must be finite and positive, got {0}")]
    InvalidMass(f32),

    #[error("seed probability must lie in [0, 1], got {0}")]
    InvalidSeedProbability(f32),

    #[error("neighbour threshold must be at most 8, got {0}")]
    InvalidThreshold(u32),

    #[error("settings decode error: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
