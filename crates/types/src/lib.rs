//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with no behavior beyond classification helpers,
//! making them usable in any context (simulation core, hint engine, presentation).
//!
//! # Board Orientation
//!
//! - `x` grows left to right, `y` grows bottom to top
//! - `y = 0` is the bottom row; gravity moves tiles toward smaller `y`
//! - New tiles appear in the cells vacated at the top of each column
//!
//! # Rule Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_RUN_LENGTH` | 3 | Shortest run that counts as a match |
//! | `MIN_PALETTE_SIZE` | 3 | Fewest distinct colors a level may use |
//! | `MAX_ICE_LAYERS` | 3 | Thickest ice overlay |
//! | `MAX_CRATE_HEALTH` | 2 | Hits needed to break the toughest crate |
//! | `ORDINARY_POINTS_PER_TILE` | 10 | Points per tile cleared by a cascade round |
//! | `SPECIAL_POINTS_PER_TILE` | 20 | Points per tile cleared by a special activation |
//! | `BOMB_RADIUS` | 1 | Bomb blast: 3x3 square |
//! | `BOMB_COMBO_RADIUS` | 2 | Bomb + Bomb: 5x5 square |
//! | `RAINBOW_COMBO_RADIUS` | 3 | Rainbow + other special: 7x7 square |
//!
//! # Iteration Ceilings
//!
//! Every loop that depends on random refills is bounded:
//!
//! - `INITIAL_REWRITE_LIMIT`: passes spent removing matches from a new board
//! - `CASCADE_ROUND_LIMIT`: clear/collapse/spawn rounds per cascade
//! - `SHUFFLE_ATTEMPT_LIMIT`: permutations tried before a shuffle re-deals colors
//!
//! # Examples
//!
//! ```
//! use gem_cascade_types::{Coord, SpecialKind, SessionState, TileKind, Color};
//!
//! let a = Coord::new(3, 4);
//! assert!(a.is_adjacent(Coord::new(3, 5)));
//! assert!(!a.is_adjacent(Coord::new(4, 5)));
//!
//! assert_eq!(SpecialKind::from_str("bomb"), Some(SpecialKind::Bomb));
//! assert!(TileKind::Gem(Color(2)).is_matchable());
//! assert!(!TileKind::Stone.is_matchable());
//! assert!(SessionState::WaitingForInput.accepts_input());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shortest run of equivalent tiles that counts as a match
pub const MIN_RUN_LENGTH: usize = 3;

/// Fewest distinct colors a level palette may contain
pub const MIN_PALETTE_SIZE: usize = 3;

/// Largest supported board side
pub const MAX_BOARD_DIMENSION: u16 = 32;

/// Thickest ice overlay a cell can carry
pub const MAX_ICE_LAYERS: u8 = 3;

/// Health of the toughest crate
pub const MAX_CRATE_HEALTH: u8 = 2;

/// Match-removal passes spent on a freshly dealt board
pub const INITIAL_REWRITE_LIMIT: u32 = 100;

/// Clear/collapse/spawn rounds allowed in one cascade before it is declared stuck
pub const CASCADE_ROUND_LIMIT: u32 = 100;

/// Permutations tried by a shuffle before it falls back to re-dealing colors
pub const SHUFFLE_ATTEMPT_LIMIT: u32 = 100;

/// Points per tile cleared by an ordinary cascade round
pub const ORDINARY_POINTS_PER_TILE: u32 = 10;

/// Points per tile cleared by a deliberate special-tile activation
pub const SPECIAL_POINTS_PER_TILE: u32 = 20;

/// Half-width of a single bomb blast (3x3)
pub const BOMB_RADIUS: i32 = 1;

/// Half-width of a bomb + bomb blast (5x5)
pub const BOMB_COMBO_RADIUS: i32 = 2;

/// Half-width of a rainbow + special blast (7x7)
pub const RAINBOW_COMBO_RADIUS: i32 = 3;

/// A grid coordinate.
///
/// Components are signed so neighbour arithmetic may step outside the board;
/// the board's bounds checks reject such coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by `(dx, dy)`
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four orthogonal neighbours: left, right, down, up
    pub const fn neighbors(self) -> [Coord; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }

    /// True when `other` shares an edge with this coordinate
    pub fn is_adjacent(self, other: Coord) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Matchable color identity, an index into the level palette's color space
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Color(pub u8);

impl Color {
    /// The palette `[Color(0), .., Color(n - 1)]`
    ///
    /// ```
    /// use gem_cascade_types::Color;
    ///
    /// assert_eq!(Color::palette(3), vec![Color(0), Color(1), Color(2)]);
    /// ```
    pub fn palette(n: u8) -> Vec<Color> {
        (0..n).map(Color).collect()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "color{}", self.0)
    }
}

/// Run / rocket orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Special tiles created by long or crossing runs
///
/// - **RocketHorizontal / RocketVertical**: clear a full row / column
/// - **Bomb**: clears a square around itself
/// - **Rainbow**: clears every tile of one color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialKind {
    RocketHorizontal,
    RocketVertical,
    Bomb,
    Rainbow,
}

impl SpecialKind {
    /// The rocket that clears along `axis`
    pub fn rocket(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => SpecialKind::RocketHorizontal,
            Axis::Vertical => SpecialKind::RocketVertical,
        }
    }

    pub fn is_rocket(&self) -> bool {
        matches!(
            self,
            SpecialKind::RocketHorizontal | SpecialKind::RocketVertical
        )
    }

    /// Parse special kind from string (case-insensitive)
    ///
    /// ```
    /// use gem_cascade_types::SpecialKind;
    ///
    /// assert_eq!(SpecialKind::from_str("rocketH"), Some(SpecialKind::RocketHorizontal));
    /// assert_eq!(SpecialKind::from_str("RAINBOW"), Some(SpecialKind::Rainbow));
    /// assert_eq!(SpecialKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rocketh" | "rockethorizontal" => Some(SpecialKind::RocketHorizontal),
            "rocketv" | "rocketvertical" => Some(SpecialKind::RocketVertical),
            "bomb" => Some(SpecialKind::Bomb),
            "rainbow" => Some(SpecialKind::Rainbow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialKind::RocketHorizontal => "rocketH",
            SpecialKind::RocketVertical => "rocketV",
            SpecialKind::Bomb => "bomb",
            SpecialKind::Rainbow => "rainbow",
        }
    }
}

/// What occupies a board cell.
///
/// An empty cell is the absence of a tile, so there is no `Empty` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileKind {
    /// Ordinary matchable gem
    Gem(Color),
    /// Special tile; its color identity is carried by the tile itself
    Special(SpecialKind),
    /// Indestructible, immovable blocker
    Stone,
    /// Destructible blocker with 1 or 2 hit points
    Crate { health: u8 },
}

impl TileKind {
    /// Gems and specials take part in runs and may be swapped
    pub fn is_matchable(&self) -> bool {
        matches!(self, TileKind::Gem(_) | TileKind::Special(_))
    }

    pub fn is_special(&self) -> bool {
        matches!(self, TileKind::Special(_))
    }

    /// Stone blocks gravity and special-tile blasts
    pub fn is_blocking(&self) -> bool {
        matches!(self, TileKind::Stone)
    }

    pub fn is_crate(&self) -> bool {
        matches!(self, TileKind::Crate { .. })
    }

    pub fn special(&self) -> Option<SpecialKind> {
        match self {
            TileKind::Special(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Stable `[tag, payload]` code used for board hashing. The payload is the
    /// gem color or crate health, so every `Color` value hashes distinctly.
    pub fn code(&self) -> [u8; 2] {
        match self {
            TileKind::Gem(Color(c)) => [1, *c],
            TileKind::Special(SpecialKind::RocketHorizontal) => [2, 0],
            TileKind::Special(SpecialKind::RocketVertical) => [3, 0],
            TileKind::Special(SpecialKind::Bomb) => [4, 0],
            TileKind::Special(SpecialKind::Rainbow) => [5, 0],
            TileKind::Stone => [6, 0],
            TileKind::Crate { health } => [7, *health],
        }
    }
}

/// Kinds of authored obstacle placements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObstacleKind {
    /// Overlay that absorbs clears; intensity is the layer count
    Ice,
    /// Tile-slot blocker; intensity is its health
    Crate,
    /// Indestructible blocker; intensity is ignored
    Stone,
}

/// Level objective kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalKind {
    /// Clear N tiles of one color
    CollectColor,
    /// Fully destroy N ice overlays
    BreakIce,
    /// Destroy N crates
    BreakCrate,
    /// Reach a cumulative score
    ReachScore,
}

impl GoalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalKind::CollectColor => "collectColor",
            GoalKind::BreakIce => "breakIce",
            GoalKind::BreakCrate => "breakCrate",
            GoalKind::ReachScore => "reachScore",
        }
    }
}

/// Game session states
///
/// ```text
/// Initializing -> WaitingForInput <-> Paused
/// WaitingForInput -> Swapping -> (CheckingMatches -> ClearingMatches -> Collapsing)*
///     -> WaitingForInput | Shuffling -> WaitingForInput | LevelComplete | GameOver
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Initializing,
    WaitingForInput,
    Paused,
    Swapping,
    CheckingMatches,
    ClearingMatches,
    Collapsing,
    Shuffling,
    LevelComplete,
    GameOver,
}

impl SessionState {
    /// Only `WaitingForInput` accepts move requests
    pub fn accepts_input(&self) -> bool {
        matches!(self, SessionState::WaitingForInput)
    }

    /// `LevelComplete` and `GameOver` hold until the session restarts
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::LevelComplete | SessionState::GameOver)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Initializing => "initializing",
            SessionState::WaitingForInput => "waitingForInput",
            SessionState::Paused => "paused",
            SessionState::Swapping => "swapping",
            SessionState::CheckingMatches => "checkingMatches",
            SessionState::ClearingMatches => "clearingMatches",
            SessionState::Collapsing => "collapsing",
            SessionState::Shuffling => "shuffling",
            SessionState::LevelComplete => "levelComplete",
            SessionState::GameOver => "gameOver",
        }
    }
}

/// One tile displaced by gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fall {
    pub kind: TileKind,
    pub x: i32,
    pub from_y: i32,
    pub to_y: i32,
}

/// Notifications for the presentation layer.
///
/// Events fire on change only and are drained by the collaborator; they never
/// carry references into the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    TileCreated { pos: Coord, kind: TileKind },
    TileChanged { pos: Coord, kind: TileKind },
    TileCleared { pos: Coord, kind: TileKind },
    TilesSwapped { a: Coord, b: Coord },
    TilesFell { falls: Vec<Fall> },
    IceChanged { pos: Coord, layers: u8 },
    CrateDamaged { pos: Coord, health: u8 },
    CrateDestroyed { pos: Coord },
    MovesChanged { remaining: u32 },
    ScoreChanged { score: u32 },
    GoalProgress { index: usize, current: u32, target: u32 },
    StateChanged { from: SessionState, to: SessionState },
    LevelComplete { score: u32 },
    GameOver { score: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_constants() {
        assert_eq!(MIN_RUN_LENGTH, 3);
        assert_eq!(MIN_PALETTE_SIZE, 3);
        assert!(SPECIAL_POINTS_PER_TILE > ORDINARY_POINTS_PER_TILE);
        assert!(BOMB_RADIUS < BOMB_COMBO_RADIUS);
        assert!(BOMB_COMBO_RADIUS < RAINBOW_COMBO_RADIUS);
    }

    #[test]
    fn test_coord_neighbors_are_adjacent() {
        let c = Coord::new(2, 2);
        for n in c.neighbors() {
            assert!(c.is_adjacent(n), "{} should touch {}", c, n);
        }
        assert!(!c.is_adjacent(c));
        assert!(!c.is_adjacent(Coord::new(4, 2)));
    }

    #[test]
    fn test_special_kind_roundtrip_names() {
        for kind in [
            SpecialKind::RocketHorizontal,
            SpecialKind::RocketVertical,
            SpecialKind::Bomb,
            SpecialKind::Rainbow,
        ] {
            assert_eq!(SpecialKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(
            SpecialKind::rocket(Axis::Vertical),
            SpecialKind::RocketVertical
        );
    }

    #[test]
    fn test_tile_kind_codes_are_distinct() {
        let kinds = [
            TileKind::Gem(Color(0)),
            TileKind::Gem(Color(1)),
            TileKind::Gem(Color(239)),
            TileKind::Gem(Color(255)),
            TileKind::Special(SpecialKind::RocketHorizontal),
            TileKind::Special(SpecialKind::RocketVertical),
            TileKind::Special(SpecialKind::Bomb),
            TileKind::Special(SpecialKind::Rainbow),
            TileKind::Stone,
            TileKind::Crate { health: 1 },
            TileKind::Crate { health: 2 },
        ];
        let mut codes: Vec<[u8; 2]> = kinds.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_session_state_predicates() {
        assert!(SessionState::WaitingForInput.accepts_input());
        assert!(!SessionState::Paused.accepts_input());
        assert!(!SessionState::Collapsing.accepts_input());
        assert!(SessionState::GameOver.is_terminal());
        assert!(SessionState::LevelComplete.is_terminal());
        assert!(!SessionState::Shuffling.is_terminal());
    }
}
