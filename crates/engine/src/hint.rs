//! Move ranking for hints and autoplay
//!
//! Every valid swap is tried on a scratch copy of the board. An ordinary swap is
//! worth the number of distinct cells in the runs it creates; a special swap is
//! worth the size of its blast. Only the first round counts, since refills are
//! random.

use std::collections::BTreeSet;

use gem_cascade_core::{matcher, moves, special, Board};
use gem_cascade_types::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    pub from: Coord,
    pub to: Coord,
    /// Cells the move clears in its first round
    pub score: usize,
}

/// Valid swaps, best first. Ties go to the lowest `(from, to)` pair.
pub fn rank_moves(board: &Board) -> Vec<Hint> {
    let mut hints: Vec<Hint> = moves::valid_swaps(board)
        .into_iter()
        .map(|(from, to)| Hint {
            from,
            to,
            score: first_round_cells(board, from, to),
        })
        .collect();
    hints.sort_by(|x, y| {
        y.score
            .cmp(&x.score)
            .then_with(|| (x.from, x.to).cmp(&(y.from, y.to)))
    });
    hints
}

pub fn suggest_move(board: &Board) -> Option<Hint> {
    rank_moves(board).into_iter().next()
}

fn first_round_cells(board: &Board, from: Coord, to: Coord) -> usize {
    let mut probe = board.clone();
    probe.swap(from, to);
    if let Some(targets) = special::move_targets(&probe, from, to) {
        return targets.len();
    }
    matcher::find_matches(&probe)
        .iter()
        .flat_map(|run| run.positions.iter().copied())
        .collect::<BTreeSet<Coord>>()
        .len()
}
