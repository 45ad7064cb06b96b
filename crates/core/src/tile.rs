//! Tile model - one occupant of a board cell
//!
//! A tile's color identity (`color`) is set for gems and specials and never for
//! blockers. Constructors enforce that; the fields are private so nothing
//! outside the crate can break it or desynchronise the stored coordinate.

use crate::types::{Color, Coord, SpecialKind, TileKind, MAX_CRATE_HEALTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    kind: TileKind,
    color: Option<Color>,
    pos: Coord,
    newly_spawned: bool,
}

impl Tile {
    fn with_kind(kind: TileKind, color: Option<Color>) -> Self {
        Self {
            kind,
            color,
            pos: Coord::default(),
            newly_spawned: false,
        }
    }

    /// Ordinary gem. Its position is assigned when placed on a board.
    pub fn gem(color: Color) -> Self {
        Self::with_kind(TileKind::Gem(color), Some(color))
    }

    /// Special tile retaining `color` as its underlying identity
    pub fn special(kind: SpecialKind, color: Color) -> Self {
        Self::with_kind(TileKind::Special(kind), Some(color))
    }

    pub fn stone() -> Self {
        Self::with_kind(TileKind::Stone, None)
    }

    /// Crate with `health` clamped to `1..=MAX_CRATE_HEALTH`
    pub fn crate_box(health: u8) -> Self {
        Self::with_kind(
            TileKind::Crate {
                health: health.clamp(1, MAX_CRATE_HEALTH),
            },
            None,
        )
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Underlying color identity (gems and specials only)
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn pos(&self) -> Coord {
        self.pos
    }

    pub fn is_newly_spawned(&self) -> bool {
        self.newly_spawned
    }

    pub fn is_matchable(&self) -> bool {
        self.kind.is_matchable()
    }

    pub fn is_special(&self) -> bool {
        self.kind.is_special()
    }

    pub fn is_rainbow(&self) -> bool {
        self.kind == TileKind::Special(SpecialKind::Rainbow)
    }

    pub fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }

    /// Only stone is pinned in place; gems, specials and crates fall
    pub fn is_fallable(&self) -> bool {
        !self.kind.is_blocking()
    }

    pub(crate) fn set_pos(&mut self, pos: Coord) {
        self.pos = pos;
    }

    pub(crate) fn mark_spawned(mut self) -> Self {
        self.newly_spawned = true;
        self
    }

    pub(crate) fn settle(&mut self) {
        self.newly_spawned = false;
    }

    /// Apply one hit to a crate, returning its remaining health.
    /// Returns `None` for anything that is not a crate.
    pub(crate) fn hit_crate(&mut self) -> Option<u8> {
        match &mut self.kind {
            TileKind::Crate { health } => {
                *health = health.saturating_sub(1);
                Some(*health)
            }
            _ => None,
        }
    }
}
