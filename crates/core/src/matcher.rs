//! Match detection - runs of identity-equivalent tiles
//!
//! Rows are scanned left to right and columns bottom to top. Horizontal and
//! vertical runs are reported independently, so a cell shared by an L or T shape
//! appears in two runs; [`derive_specials`] turns that overlap into a bomb.
//!
//! Equivalence is judged against a run's anchor, its first non-Rainbow tile.
//! A Rainbow joins a run of any single color but never bridges two colors.

use crate::board::Board;
use crate::types::{Axis, Color, Coord, SpecialKind, MIN_RUN_LENGTH};

/// A horizontal or vertical run of at least [`MIN_RUN_LENGTH`] equivalent tiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRun {
    pub positions: Vec<Coord>,
    pub axis: Axis,
    /// Anchor color; the underlying color for a run made only of rainbows
    pub color: Color,
}

impl MatchRun {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, pos: Coord) -> bool {
        self.positions.contains(&pos)
    }

    /// Integer-rounded average of the run's coordinates (halves round up)
    pub fn centroid(&self) -> Coord {
        let n = self.positions.len().max(1) as i32;
        let (sx, sy) = self
            .positions
            .iter()
            .fold((0, 0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Coord::new((sx + n / 2) / n, (sy + n / 2) / n)
    }

    /// Special earned by the run's length alone
    pub fn special(&self) -> Option<SpecialKind> {
        match self.positions.len() {
            4 => Some(SpecialKind::rocket(self.axis)),
            n if n >= 5 => Some(SpecialKind::Rainbow),
            _ => None,
        }
    }
}

/// A special tile to be placed after a clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialSpawn {
    pub pos: Coord,
    pub kind: SpecialKind,
    pub color: Color,
}

/// Every run on the board: all horizontal runs (bottom row first), then all
/// vertical runs (left column first)
pub fn find_matches(board: &Board) -> Vec<MatchRun> {
    let mut runs = Vec::new();
    let mut line = Vec::with_capacity(board.width().max(board.height()) as usize);

    for y in 0..board.height() {
        line.clear();
        line.extend((0..board.width()).map(|x| Coord::new(x, y)));
        scan_line(board, &line, Axis::Horizontal, &mut runs);
    }
    for x in 0..board.width() {
        line.clear();
        line.extend((0..board.height()).map(|y| Coord::new(x, y)));
        scan_line(board, &line, Axis::Vertical, &mut runs);
    }

    runs
}

/// True when `pos` belongs to a run in its row or column.
///
/// Scans exactly the lines the full detector would, so the two always agree.
pub fn is_part_of_match(board: &Board, pos: Coord) -> bool {
    if board.get(pos).map_or(true, |tile| !tile.is_matchable()) {
        return false;
    }

    let mut runs = Vec::new();
    let row: Vec<Coord> = (0..board.width()).map(|x| Coord::new(x, pos.y)).collect();
    scan_line(board, &row, Axis::Horizontal, &mut runs);
    if runs.iter().any(|run| run.contains(pos)) {
        return true;
    }

    runs.clear();
    let column: Vec<Coord> = (0..board.height()).map(|y| Coord::new(pos.x, y)).collect();
    scan_line(board, &column, Axis::Vertical, &mut runs);
    runs.iter().any(|run| run.contains(pos))
}

pub fn has_any_match(board: &Board) -> bool {
    !find_matches(board).is_empty()
}

/// Greedy run extension along one line, recording runs of `MIN_RUN_LENGTH` or more
fn scan_line(board: &Board, line: &[Coord], axis: Axis, runs: &mut Vec<MatchRun>) {
    let mut start = 0;
    while start < line.len() {
        let Some(first) = board.get(line[start]).filter(|t| t.is_matchable()) else {
            start += 1;
            continue;
        };

        let mut anchor = if first.is_rainbow() {
            None
        } else {
            first.color()
        };
        let mut end = start + 1;
        while end < line.len() {
            let Some(tile) = board.get(line[end]).filter(|t| t.is_matchable()) else {
                break;
            };
            if tile.is_rainbow() {
                end += 1;
                continue;
            }
            match anchor {
                None => anchor = tile.color(),
                Some(color) if tile.color() == Some(color) => {}
                Some(_) => break,
            }
            end += 1;
        }

        if end - start >= MIN_RUN_LENGTH {
            runs.push(MatchRun {
                positions: line[start..end].to_vec(),
                axis,
                color: anchor.or(first.color()).unwrap_or_default(),
            });
            start = end;
        } else {
            start += 1;
        }
    }
}

/// Specials earned by one detection pass.
///
/// A horizontal and a vertical run sharing a cell produce a bomb there, and
/// neither run contributes its own length special. Remaining runs of 4 or 5+
/// place a rocket or rainbow at their centroid. At most one special per cell;
/// bombs win.
pub fn derive_specials(runs: &[MatchRun]) -> Vec<SpecialSpawn> {
    let mut used = vec![false; runs.len()];
    let mut spawns: Vec<SpecialSpawn> = Vec::new();

    for (i, horizontal) in runs.iter().enumerate() {
        if horizontal.axis != Axis::Horizontal || used[i] {
            continue;
        }
        for (j, vertical) in runs.iter().enumerate() {
            if vertical.axis != Axis::Vertical || used[j] {
                continue;
            }
            if let Some(&shared) = horizontal.positions.iter().find(|p| vertical.contains(**p)) {
                spawns.push(SpecialSpawn {
                    pos: shared,
                    kind: SpecialKind::Bomb,
                    color: horizontal.color,
                });
                used[i] = true;
                used[j] = true;
                break;
            }
        }
    }

    for (i, run) in runs.iter().enumerate() {
        if used[i] {
            continue;
        }
        let Some(kind) = run.special() else {
            continue;
        };
        let pos = run.centroid();
        if spawns.iter().any(|spawn| spawn.pos == pos) {
            continue;
        }
        spawns.push(SpecialSpawn {
            pos,
            kind,
            color: run.color,
        });
    }

    spawns
}
