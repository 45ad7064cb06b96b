//! Level configuration - the authored description of one level
//!
//! A [`LevelConfig`] is plain serde data (usually read from JSON by the host)
//! plus builder helpers for code and tests. [`LevelConfig::validate`] splits
//! problems into hard errors, which make the level unplayable, and warnings,
//! which initialization logs and then ignores or clamps.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigWarning, LevelError};
use crate::types::{
    Color, Coord, GoalKind, ObstacleKind, MAX_BOARD_DIMENSION, MAX_CRATE_HEALTH, MAX_ICE_LAYERS,
    MIN_PALETTE_SIZE,
};

/// Moves granted when a level does not say otherwise
pub const DEFAULT_MOVE_LIMIT: u32 = 20;

/// Objective template; progress always starts at zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTemplate {
    pub kind: GoalKind,
    #[serde(default)]
    pub color: Option<Color>,
    pub amount: u32,
}

/// An authored obstacle.
///
/// `intensity` is the ice layer count or the crate health; stone ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstaclePlacement {
    pub pos: Coord,
    pub kind: ObstacleKind,
    #[serde(default = "default_intensity")]
    pub intensity: u8,
}

fn default_intensity() -> u8 {
    1
}

impl ObstaclePlacement {
    /// Intensity clamped to the range the obstacle supports
    pub fn effective_intensity(&self) -> u8 {
        match self.kind {
            ObstacleKind::Ice => self.intensity.clamp(1, MAX_ICE_LAYERS),
            ObstacleKind::Crate => self.intensity.clamp(1, MAX_CRATE_HEALTH),
            ObstacleKind::Stone => self.intensity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    pub width: u16,
    pub height: u16,
    pub palette: Vec<Color>,
    #[serde(default = "default_move_limit")]
    pub move_limit: u32,
    #[serde(default)]
    pub goals: Vec<GoalTemplate>,
    /// Optional static layout indexed `[y][x]` (row 0 is the bottom row).
    /// `None` cells are dealt randomly.
    #[serde(default)]
    pub layout: Option<Vec<Vec<Option<Color>>>>,
    #[serde(default)]
    pub obstacles: Vec<ObstaclePlacement>,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_move_limit() -> u32 {
    DEFAULT_MOVE_LIMIT
}

impl LevelConfig {
    pub fn new(width: u16, height: u16, palette: Vec<Color>) -> Self {
        Self {
            width,
            height,
            palette,
            move_limit: DEFAULT_MOVE_LIMIT,
            goals: Vec::new(),
            layout: None,
            obstacles: Vec::new(),
            seed: None,
        }
    }

    pub fn with_moves(mut self, move_limit: u32) -> Self {
        self.move_limit = move_limit;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_goal(mut self, kind: GoalKind, color: Option<Color>, amount: u32) -> Self {
        self.goals.push(GoalTemplate {
            kind,
            color,
            amount,
        });
        self
    }

    pub fn with_obstacle(mut self, pos: Coord, kind: ObstacleKind, intensity: u8) -> Self {
        self.obstacles.push(ObstaclePlacement {
            pos,
            kind,
            intensity,
        });
        self
    }

    pub fn with_layout(mut self, layout: Vec<Vec<Option<Color>>>) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Distinct palette colors in ascending order; this is what gets dealt
    pub fn playable_palette(&self) -> Vec<Color> {
        let mut colors = self.palette.clone();
        colors.sort_unstable();
        colors.dedup();
        colors
    }

    pub fn contains(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Authored layout color at `pos`, if any
    pub fn layout_color(&self, pos: Coord) -> Option<Color> {
        let layout = self.layout.as_ref()?;
        let row = layout.get(usize::try_from(pos.y).ok()?)?;
        row.get(usize::try_from(pos.x).ok()?).copied().flatten()
    }

    /// Check the level, returning recoverable warnings or the first hard error
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, LevelError> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_BOARD_DIMENSION
            || self.height > MAX_BOARD_DIMENSION
        {
            return Err(LevelError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let palette = self.playable_palette();
        if palette.len() < MIN_PALETTE_SIZE {
            return Err(LevelError::PaletteTooSmall(palette.len()));
        }

        if self.move_limit == 0 {
            return Err(LevelError::NoMoves);
        }

        let mut warnings = Vec::new();

        for (index, goal) in self.goals.iter().enumerate() {
            if goal.amount == 0 {
                return Err(LevelError::EmptyGoal { index });
            }
            if goal.kind == GoalKind::CollectColor {
                let Some(color) = goal.color else {
                    return Err(LevelError::MissingGoalColor { index });
                };
                if !palette.contains(&color) {
                    warnings.push(ConfigWarning::GoalColorNotInPalette { index, color });
                }
            }
        }

        if let Some(layout) = &self.layout {
            if layout.len() != self.height as usize {
                warnings.push(ConfigWarning::LayoutHeightMismatch {
                    rows: layout.len(),
                    height: self.height,
                });
            }
            for (row, cells) in layout.iter().enumerate() {
                if cells.len() != self.width as usize {
                    warnings.push(ConfigWarning::LayoutWidthMismatch {
                        row,
                        cells: cells.len(),
                        width: self.width,
                    });
                }
                for (x, cell) in cells.iter().enumerate() {
                    if let Some(color) = cell {
                        if !palette.contains(color) {
                            warnings.push(ConfigWarning::LayoutColorNotInPalette {
                                pos: Coord::new(x as i32, row as i32),
                                color: *color,
                            });
                        }
                    }
                }
            }
        }

        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if !self.contains(obstacle.pos) {
                warnings.push(ConfigWarning::ObstacleOutOfBounds {
                    index,
                    pos: obstacle.pos,
                });
                continue;
            }
            let used = obstacle.effective_intensity();
            if used != obstacle.intensity {
                warnings.push(ConfigWarning::IntensityClamped {
                    index,
                    pos: obstacle.pos,
                    given: obstacle.intensity,
                    used,
                });
            }
        }

        Ok(warnings)
    }
}

impl Default for LevelConfig {
    /// 8x8 board, five colors, no goals or obstacles
    fn default() -> Self {
        Self::new(8, 8, Color::palette(5))
    }
}
