//! Scoring module - points for cleared tiles
//!
//! Every removed tile is worth a flat amount that depends only on what caused
//! the clear: an ordinary cascade round pays `ORDINARY_POINTS_PER_TILE`, a
//! deliberate special activation pays `SPECIAL_POINTS_PER_TILE`.

use crate::types::{ORDINARY_POINTS_PER_TILE, SPECIAL_POINTS_PER_TILE};

/// What triggered a clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearSource {
    /// Runs found by the match detector
    Cascade,
    /// The target set of a swapped special tile or combo
    Special,
}

pub fn points_per_tile(source: ClearSource) -> u32 {
    match source {
        ClearSource::Cascade => ORDINARY_POINTS_PER_TILE,
        ClearSource::Special => SPECIAL_POINTS_PER_TILE,
    }
}

/// Points for removing `tiles` tiles in one clear
pub fn clear_score(tiles: usize, source: ClearSource) -> u32 {
    (tiles as u32).saturating_mul(points_per_tile(source))
}
