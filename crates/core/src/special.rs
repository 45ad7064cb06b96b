//! Special tile engine - blast areas for activated specials and combos
//!
//! Target sets are computed against the current board without requiring the
//! cells to be matched. They hold only cells occupied by a non-blocking tile,
//! come back sorted and deduplicated, and are fed to the cascade resolver's clear
//! phase, where ice interception still applies.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::types::{
    Color, Coord, SpecialKind, BOMB_COMBO_RADIUS, BOMB_RADIUS, RAINBOW_COMBO_RADIUS,
};

/// Cells hit by one special activated at `pos`.
///
/// A Rainbow needs `target_color` (its swap partner's color); without one it hits nothing.
pub fn activation_targets(
    board: &Board,
    pos: Coord,
    kind: SpecialKind,
    target_color: Option<Color>,
) -> Vec<Coord> {
    let mut targets = BTreeSet::new();
    match kind {
        SpecialKind::RocketHorizontal => add_rows(board, pos.y, pos.y, &mut targets),
        SpecialKind::RocketVertical => add_columns(board, pos.x, pos.x, &mut targets),
        SpecialKind::Bomb => add_square(board, pos, BOMB_RADIUS, &mut targets),
        SpecialKind::Rainbow => {
            if let Some(color) = target_color {
                targets.extend(
                    board
                        .tiles()
                        .filter(|tile| tile.color() == Some(color))
                        .map(|tile| tile.pos()),
                );
            }
        }
    }
    targets.into_iter().collect()
}

/// Cells hit when specials `a` and `b` are swapped together at `swap_point`
pub fn combo_targets(board: &Board, swap_point: Coord, a: SpecialKind, b: SpecialKind) -> Vec<Coord> {
    use SpecialKind::*;

    let mut targets = BTreeSet::new();
    let Coord { x, y } = swap_point;
    match (a, b) {
        (Rainbow, Rainbow) => add_rows(board, 0, board.height() - 1, &mut targets),
        (Rainbow, _) | (_, Rainbow) => {
            add_square(board, swap_point, RAINBOW_COMBO_RADIUS, &mut targets)
        }
        (Bomb, Bomb) => add_square(board, swap_point, BOMB_COMBO_RADIUS, &mut targets),
        (Bomb, RocketHorizontal) | (RocketHorizontal, Bomb) => {
            add_rows(board, y - 1, y + 1, &mut targets)
        }
        (Bomb, RocketVertical) | (RocketVertical, Bomb) => {
            add_columns(board, x - 1, x + 1, &mut targets)
        }
        _ => {
            add_rows(board, y, y, &mut targets);
            add_columns(board, x, x, &mut targets);
        }
    }
    targets.into_iter().collect()
}

/// Cells cleared by a move between `a` and `b`, evaluated after the swap.
///
/// Returns `None` when neither endpoint holds a special. One special activates
/// where it landed (a Rainbow takes its partner's color) and is always consumed.
/// Two specials use the combo table at `b`, the move's destination, and both are
/// consumed.
pub fn move_targets(board: &Board, a: Coord, b: Coord) -> Option<Vec<Coord>> {
    let tile_a = board.get(a)?;
    let tile_b = board.get(b)?;

    let mut targets: BTreeSet<Coord> = BTreeSet::new();
    match (tile_a.kind().special(), tile_b.kind().special()) {
        (None, None) => return None,
        (Some(kind_a), Some(kind_b)) => {
            targets.extend(combo_targets(board, b, kind_a, kind_b));
            targets.insert(a);
            targets.insert(b);
        }
        (Some(kind), None) => {
            targets.extend(activation_targets(board, a, kind, tile_b.color()));
            targets.insert(a);
        }
        (None, Some(kind)) => {
            targets.extend(activation_targets(board, b, kind, tile_a.color()));
            targets.insert(b);
        }
    }
    Some(targets.into_iter().collect())
}

fn add_cell(board: &Board, pos: Coord, targets: &mut BTreeSet<Coord>) {
    if board.get(pos).is_some_and(|tile| !tile.is_blocking()) {
        targets.insert(pos);
    }
}

fn add_rows(board: &Board, from_y: i32, to_y: i32, targets: &mut BTreeSet<Coord>) {
    for y in from_y.max(0)..=to_y.min(board.height() - 1) {
        for x in 0..board.width() {
            add_cell(board, Coord::new(x, y), targets);
        }
    }
}

fn add_columns(board: &Board, from_x: i32, to_x: i32, targets: &mut BTreeSet<Coord>) {
    for x in from_x.max(0)..=to_x.min(board.width() - 1) {
        for y in 0..board.height() {
            add_cell(board, Coord::new(x, y), targets);
        }
    }
}

fn add_square(board: &Board, center: Coord, radius: i32, targets: &mut BTreeSet<Coord>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            add_cell(board, center.offset(dx, dy), targets);
        }
    }
}
