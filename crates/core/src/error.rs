use thiserror::Error;

use crate::types::{Color, Coord, MIN_PALETTE_SIZE};

/// A level configuration that cannot be played
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("palette has {0} distinct colors, at least {min} are required", min = MIN_PALETTE_SIZE)]
    PaletteTooSmall(usize),

    #[error("board dimensions {width}x{height} are out of range")]
    InvalidDimensions { width: u16, height: u16 },

    #[error("move limit must be at least 1")]
    NoMoves,

    #[error("goal {index}: collectColor requires a target color")]
    MissingGoalColor { index: usize },

    #[error("goal {index}: target amount must be at least 1")]
    EmptyGoal { index: usize },
}

/// Authoring problems that are ignored or clamped at initialization
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    #[error("obstacle {index} at {pos} is outside the board and was ignored")]
    ObstacleOutOfBounds { index: usize, pos: Coord },

    #[error("obstacle {index} at {pos}: intensity {given} clamped to {used}")]
    IntensityClamped {
        index: usize,
        pos: Coord,
        given: u8,
        used: u8,
    },

    #[error("layout has {rows} rows for a board {height} high; missing cells are random")]
    LayoutHeightMismatch { rows: usize, height: u16 },

    #[error("layout row {row} has {cells} cells for a board {width} wide")]
    LayoutWidthMismatch { row: usize, cells: usize, width: u16 },

    #[error("layout cell {pos} uses {color}, which is not in the palette")]
    LayoutColorNotInPalette { pos: Coord, color: Color },

    #[error("goal {index} targets {color}, which is not in the palette")]
    GoalColorNotInPalette { index: usize, color: Color },
}

/// Errors surfaced by the simulation core.
///
/// Everything except `Level` is an invariant violation: a bug, not bad input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid level: {0}")]
    Level(#[from] LevelError),

    #[error("cascade did not stabilize within {rounds} rounds")]
    CascadeDidNotStabilize { rounds: u32 },

    #[error("tile stored at {expected} claims to be at {found}")]
    CoordinateDesync { expected: Coord, found: Coord },

    #[error("could not deal a playable board after {attempts} shuffle attempts")]
    ShuffleExhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
