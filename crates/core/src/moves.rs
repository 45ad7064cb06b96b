//! Move probing and reshuffling
//!
//! A swap is productive when it creates a run at either endpoint, or when either
//! endpoint holds a special tile (specials always activate). Probes swap, test and
//! swap back on a scratch copy, so callers never see a half-applied probe.

use crate::board::Board;
use crate::error::{CoreError, Result};
use crate::matcher;
use crate::rng::TileRng;
use crate::tile::Tile;
use crate::types::{Color, Coord, TileKind, SHUFFLE_ATTEMPT_LIMIT};

/// Only gems and specials can be moved by the player
pub fn is_swappable(board: &Board, pos: Coord) -> bool {
    board.get(pos).is_some_and(|tile| tile.is_matchable())
}

/// True when swapping `a` and `b` would be accepted as a move.
/// The board is restored before returning.
pub fn swap_is_valid(board: &mut Board, a: Coord, b: Coord) -> bool {
    if !a.is_adjacent(b) || !is_swappable(board, a) || !is_swappable(board, b) {
        return false;
    }
    if board.get(a).is_some_and(|t| t.is_special()) || board.get(b).is_some_and(|t| t.is_special()) {
        return true;
    }

    board.swap(a, b);
    let productive = matcher::is_part_of_match(board, a) || matcher::is_part_of_match(board, b);
    board.swap(a, b);
    productive
}

/// Every productive adjacent swap, each pair listed once with `a < b`
pub fn valid_swaps(board: &Board) -> Vec<(Coord, Coord)> {
    let mut probe = board.clone();
    let mut swaps = Vec::new();
    for a in board.coords() {
        for b in [a.offset(1, 0), a.offset(0, 1)] {
            if swap_is_valid(&mut probe, a, b) {
                swaps.push((a, b));
            }
        }
    }
    swaps
}

pub fn has_valid_moves(board: &Board) -> bool {
    let mut probe = board.clone();
    board.coords().any(|a| {
        [a.offset(1, 0), a.offset(0, 1)]
            .into_iter()
            .any(|b| swap_is_valid(&mut probe, a, b))
    })
}

/// Rearrange the gems until the board has no runs and at least one valid move.
///
/// Gems are permuted in place; obstacles, ice and specials keep their cells.
/// After `SHUFFLE_ATTEMPT_LIMIT` failed permutations the gem colors are dealt
/// again from `palette`. Returns the tiles whose kind changed; on failure the
/// board is restored and [`CoreError::ShuffleExhausted`] is returned.
pub fn reshuffle<R: TileRng>(board: &mut Board, rng: &mut R, palette: &[Color]) -> Result<Vec<Tile>> {
    let original = board.clone();
    let slots: Vec<Coord> = board
        .coords()
        .filter(|pos| matches!(board.get(*pos).map(|t| t.kind()), Some(TileKind::Gem(_))))
        .collect();
    let mut colors: Vec<Color> = slots
        .iter()
        .filter_map(|pos| board.get(*pos).and_then(|t| t.color()))
        .collect();

    for attempt in 0..SHUFFLE_ATTEMPT_LIMIT {
        rng.shuffle(&mut colors);
        for (pos, color) in slots.iter().zip(&colors) {
            board.set(*pos, Some(Tile::gem(*color)));
        }
        if is_playable(board) {
            tracing::debug!(attempt, "shuffle found a playable arrangement");
            return Ok(changed_tiles(&original, board));
        }
    }

    if !palette.is_empty() {
        for attempt in 0..SHUFFLE_ATTEMPT_LIMIT {
            for pos in &slots {
                board.set(*pos, Some(Tile::gem(rng.pick_color(palette))));
            }
            board.remove_initial_matches(rng, palette);
            if is_playable(board) {
                tracing::warn!(attempt, "shuffle fell back to re-dealing gem colors");
                return Ok(changed_tiles(&original, board));
            }
        }
    }

    *board = original;
    let attempts = SHUFFLE_ATTEMPT_LIMIT * 2;
    tracing::error!("no playable arrangement after {} shuffle attempts", attempts);
    Err(CoreError::ShuffleExhausted { attempts })
}

fn is_playable(board: &Board) -> bool {
    !matcher::has_any_match(board) && has_valid_moves(board)
}

fn changed_tiles(before: &Board, after: &Board) -> Vec<Tile> {
    after
        .coords()
        .filter(|pos| before.get(*pos).map(|t| t.kind()) != after.get(*pos).map(|t| t.kind()))
        .filter_map(|pos| after.get(pos).copied())
        .collect()
}
