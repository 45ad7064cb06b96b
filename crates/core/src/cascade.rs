//! Cascade resolver - the clear / damage / collapse / spawn pipeline
//!
//! One cascade is every round triggered by a single move:
//!
//! 1. detect runs (stop when there are none)
//! 2. clear run cells, letting ice absorb hits, then place derived specials
//! 3. damage crates and ice orthogonally adjacent to the cleared cells
//! 4. collapse columns
//! 5. fill holes with new gems
//!
//! Rounds are bounded by a round limit; exceeding it is reported as
//! [`CoreError::CascadeDidNotStabilize`] instead of looping forever.
//! The resolver only mutates the board and returns reports. Score, goals and
//! events are the session's business.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::error::{CoreError, Result};
use crate::goals::GoalEvent;
use crate::matcher::{self, MatchRun, SpecialSpawn};
use crate::rng::TileRng;
use crate::scoring::{clear_score, ClearSource};
use crate::tile::Tile;
use crate::types::{Color, Coord, Fall, TileKind, CASCADE_ROUND_LIMIT};

/// A tile that was actually removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearedTile {
    pub pos: Coord,
    pub kind: TileKind,
    pub color: Option<Color>,
}

/// Ice overlay after being hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IceHit {
    pub pos: Coord,
    pub layers: u8,
}

/// Crate after being hit; `health == 0` means destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrateHit {
    pub pos: Coord,
    pub health: u8,
}

/// Everything one clear step did to the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub cleared: Vec<ClearedTile>,
    pub ice: Vec<IceHit>,
    pub crates: Vec<CrateHit>,
    /// Specials placed by the clear and gems replacing destroyed crates
    pub created: Vec<Tile>,
    pub points: u32,
    pub goal_events: Vec<GoalEvent>,
}

impl ClearReport {
    pub fn cleared_at(&self, pos: Coord) -> bool {
        self.cleared.iter().any(|c| c.pos == pos)
    }
}

/// One clear / collapse / spawn round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Round {
    /// Runs that triggered the round; empty for a special activation
    pub matches: Vec<MatchRun>,
    pub clear: ClearReport,
    pub falls: Vec<Fall>,
    pub spawned: Vec<Tile>,
}

pub struct CascadeResolver<'a, R: TileRng> {
    board: &'a mut Board,
    rng: &'a mut R,
    palette: &'a [Color],
    round_limit: u32,
}

impl<'a, R: TileRng> CascadeResolver<'a, R> {
    pub fn new(board: &'a mut Board, rng: &'a mut R, palette: &'a [Color]) -> Self {
        Self {
            board,
            rng,
            palette,
            round_limit: CASCADE_ROUND_LIMIT,
        }
    }

    pub fn with_round_limit(mut self, round_limit: u32) -> Self {
        self.round_limit = round_limit;
        self
    }

    /// Run ordinary rounds until the board has no runs left
    pub fn resolve(&mut self) -> Result<Vec<Round>> {
        let mut rounds = Vec::new();
        loop {
            let matches = matcher::find_matches(self.board);
            if matches.is_empty() {
                return Ok(rounds);
            }
            if rounds.len() as u32 >= self.round_limit {
                tracing::error!(
                    "cascade still has {} runs after {} rounds",
                    matches.len(),
                    self.round_limit
                );
                return Err(CoreError::CascadeDidNotStabilize {
                    rounds: self.round_limit,
                });
            }

            let specials = matcher::derive_specials(&matches);
            let targets: Vec<Coord> = matches
                .iter()
                .flat_map(|run| run.positions.iter().copied())
                .collect();
            let clear = self.clear(&targets, &specials, ClearSource::Cascade);
            let (falls, spawned) = self.refill();

            tracing::debug!(
                round = rounds.len() + 1,
                runs = matches.len(),
                cleared = clear.cleared.len(),
                specials = specials.len(),
                "cascade round"
            );
            rounds.push(Round {
                matches,
                clear,
                falls,
                spawned,
            });
        }
    }

    /// Clear a special tile's target set, then collapse and refill once.
    /// Follow with [`resolve`](Self::resolve) to settle any runs it leaves.
    pub fn activate(&mut self, targets: &[Coord]) -> Round {
        let clear = self.clear(targets, &[], ClearSource::Special);
        let (falls, spawned) = self.refill();
        tracing::debug!(
            targets = targets.len(),
            cleared = clear.cleared.len(),
            "special activation"
        );
        Round {
            matches: Vec::new(),
            clear,
            falls,
            spawned,
        }
    }

    /// Clear `targets`, place `specials`, and damage adjacent obstacles.
    ///
    /// A cell with ice loses one layer instead of its tile; the tile goes only
    /// when the hit takes the last layer. Crates lose one health. Stone is untouched.
    /// Neighbours of removed tiles take one hit each; shielded cells and crate
    /// hits do not spread damage.
    pub fn clear(
        &mut self,
        targets: &[Coord],
        specials: &[SpecialSpawn],
        source: ClearSource,
    ) -> ClearReport {
        let mut report = ClearReport::default();
        let mut hit: BTreeSet<Coord> = BTreeSet::new();

        for &pos in targets {
            let Some(tile) = self.board.get(pos).copied() else {
                continue;
            };
            if tile.is_blocking() || !hit.insert(pos) {
                continue;
            }

            if let Some(layers) = self.board.crack_ice(pos) {
                report.ice.push(IceHit { pos, layers });
                if layers > 0 {
                    continue;
                }
                report.goal_events.push(GoalEvent::IceDestroyed { pos });
            }

            if tile.kind().is_crate() {
                self.hit_crate(pos, &mut report);
                continue;
            }

            if let Some(removed) = self.board.clear_tile(pos) {
                report.cleared.push(ClearedTile {
                    pos,
                    kind: removed.kind(),
                    color: removed.color(),
                });
                report.goal_events.push(GoalEvent::TileCleared {
                    kind: removed.kind(),
                    color: removed.color(),
                });
            }
        }
        report.points = clear_score(report.cleared.len(), source);

        for spawn in specials {
            if self
                .board
                .set(spawn.pos, Some(Tile::special(spawn.kind, spawn.color)))
            {
                if let Some(tile) = self.board.get(spawn.pos) {
                    report.created.push(*tile);
                }
            }
        }

        // Only removed tiles spread damage; each neighbour takes at most one hit
        let removed: Vec<Coord> = report.cleared.iter().map(|tile| tile.pos).collect();
        let mut damaged: BTreeSet<Coord> = BTreeSet::new();
        for pos in removed {
            for neighbor in self.board.neighbors(pos) {
                if hit.contains(&neighbor) || !damaged.insert(neighbor) {
                    continue;
                }
                if self.board.get(neighbor).is_some_and(|t| t.kind().is_crate()) {
                    self.hit_crate(neighbor, &mut report);
                }
                if let Some(layers) = self.board.crack_ice(neighbor) {
                    report.ice.push(IceHit {
                        pos: neighbor,
                        layers,
                    });
                    if layers == 0 {
                        report
                            .goal_events
                            .push(GoalEvent::IceDestroyed { pos: neighbor });
                    }
                }
            }
        }

        report
    }

    /// One hit on the crate at `pos`; a destroyed crate leaves a fresh gem behind
    fn hit_crate(&mut self, pos: Coord, report: &mut ClearReport) {
        let Some(health) = self.board.get_mut(pos).and_then(|tile| tile.hit_crate()) else {
            return;
        };
        report.crates.push(CrateHit { pos, health });
        if health > 0 {
            return;
        }

        report.goal_events.push(GoalEvent::CrateDestroyed { pos });
        self.board.clear_tile(pos);
        if self.palette.is_empty() {
            return;
        }
        let gem = Tile::gem(self.rng.pick_color(self.palette)).mark_spawned();
        self.board.set(pos, Some(gem));
        if let Some(tile) = self.board.get(pos) {
            report.created.push(*tile);
        }
    }

    fn refill(&mut self) -> (Vec<Fall>, Vec<Tile>) {
        self.board.clear_spawn_flags();
        let falls = self.board.collapse_columns();
        let spawned = self.board.spawn_fill(&mut *self.rng, self.palette);
        (falls, spawned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::BoardRng;
    use crate::types::SpecialKind;

    fn palette() -> Vec<Color> {
        Color::palette(4)
    }

    #[test]
    fn test_resolve_clears_run_and_refills() {
        let mut board = Board::from_ascii(&[
            "1 2 3", //
            "2 3 1", //
            "0 0 0", //
        ]);
        let mut rng = BoardRng::new(3);
        let palette = palette();
        let rounds = CascadeResolver::new(&mut board, &mut rng, &palette)
            .resolve()
            .unwrap();

        assert!(!rounds.is_empty());
        assert_eq!(rounds[0].clear.cleared.len(), 3);
        assert_eq!(rounds[0].clear.points, 30);
        assert_eq!(board.holes(), 0);
        assert!(!matcher::has_any_match(&board));
    }

    #[test]
    fn test_ice_absorbs_hit() {
        let mut board = Board::from_ascii(&["0 0 0"]);
        board.set_ice(Coord::new(1, 0), 2);
        let mut rng = BoardRng::new(3);
        let palette = palette();

        let mut resolver = CascadeResolver::new(&mut board, &mut rng, &palette);
        let targets = [Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)];
        let report = resolver.clear(&targets, &[], ClearSource::Cascade);

        assert_eq!(report.cleared.len(), 2);
        assert!(!report.cleared_at(Coord::new(1, 0)));
        assert_eq!(
            report.ice,
            vec![IceHit {
                pos: Coord::new(1, 0),
                layers: 1
            }]
        );
        assert!(report
            .goal_events
            .iter()
            .all(|e| !matches!(e, GoalEvent::IceDestroyed { .. })));
        assert!(board.get(Coord::new(1, 0)).is_some());
    }

    #[test]
    fn test_last_ice_layer_removes_tile() {
        let mut board = Board::from_ascii(&["0"]);
        board.set_ice(Coord::new(0, 0), 1);
        let mut rng = BoardRng::new(3);
        let palette = palette();

        let mut resolver = CascadeResolver::new(&mut board, &mut rng, &palette);
        let report = resolver.clear(&[Coord::new(0, 0)], &[], ClearSource::Cascade);

        assert!(report.cleared_at(Coord::new(0, 0)));
        let destroyed = report
            .goal_events
            .iter()
            .filter(|e| matches!(e, GoalEvent::IceDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 1);
    }

    #[test]
    fn test_adjacent_crates_damaged_once() {
        // Crate at (1, 1) touches two cleared cells but takes one hit
        let mut board = Board::from_ascii(&[
            "2 C 3", //
            "0 0 0", //
        ]);
        let mut rng = BoardRng::new(3);
        let palette = palette();
        let targets = [Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)];

        let mut resolver = CascadeResolver::new(&mut board, &mut rng, &palette);
        let report = resolver.clear(&targets, &[], ClearSource::Cascade);
        assert_eq!(
            report.crates,
            vec![CrateHit {
                pos: Coord::new(1, 1),
                health: 1
            }]
        );
        assert_eq!(
            board.get(Coord::new(1, 1)).map(|t| t.kind()),
            Some(TileKind::Crate { health: 1 })
        );
    }

    #[test]
    fn test_shielded_cell_does_not_damage_neighbours() {
        let mut board = Board::from_ascii(&[
            "C", //
            "0", //
        ]);
        board.set_ice(Coord::new(0, 0), 2);
        let mut rng = BoardRng::new(3);
        let palette = palette();

        let mut resolver = CascadeResolver::new(&mut board, &mut rng, &palette);
        let report = resolver.clear(&[Coord::new(0, 0)], &[], ClearSource::Cascade);
        assert!(report.cleared.is_empty());
        assert!(report.crates.is_empty());
        assert_eq!(
            board.get(Coord::new(0, 1)).map(|t| t.kind()),
            Some(TileKind::Crate { health: 2 })
        );
        assert_eq!(board.ice(Coord::new(0, 0)), 1);
    }

    #[test]
    fn test_crate_hit_does_not_spread() {
        let mut board = Board::from_ascii(&["C C"]);
        board.set_ice(Coord::new(1, 0), 1);
        let mut rng = BoardRng::new(3);
        let palette = palette();

        let mut resolver = CascadeResolver::new(&mut board, &mut rng, &palette);
        let report = resolver.clear(&[Coord::new(0, 0)], &[], ClearSource::Special);
        assert_eq!(
            report.crates,
            vec![CrateHit {
                pos: Coord::new(0, 0),
                health: 1
            }]
        );
        assert!(report.ice.is_empty());
        assert_eq!(
            board.get(Coord::new(1, 0)).map(|t| t.kind()),
            Some(TileKind::Crate { health: 2 })
        );
        assert_eq!(board.ice(Coord::new(1, 0)), 1);
    }

    #[test]
    fn test_destroyed_crate_becomes_gem() {
        let mut board = Board::from_ascii(&[
            "c", //
            "0", //
        ]);
        let mut rng = BoardRng::new(3);
        let palette = palette();

        let mut resolver = CascadeResolver::new(&mut board, &mut rng, &palette);
        let report = resolver.clear(&[Coord::new(0, 0)], &[], ClearSource::Cascade);
        assert!(report
            .goal_events
            .contains(&GoalEvent::CrateDestroyed { pos: Coord::new(0, 1) }));
        assert!(matches!(
            board.get(Coord::new(0, 1)).map(|t| t.kind()),
            Some(TileKind::Gem(_))
        ));
    }

    #[test]
    fn test_specials_are_placed_after_clear() {
        let mut board = Board::from_ascii(&["1 1 1 1"]);
        let mut rng = BoardRng::new(3);
        let palette = palette();
        let runs = matcher::find_matches(&board);
        let specials = matcher::derive_specials(&runs);

        let mut resolver = CascadeResolver::new(&mut board, &mut rng, &palette);
        let report = resolver.clear(&runs[0].positions, &specials, ClearSource::Cascade);

        assert_eq!(report.cleared.len(), 4);
        assert_eq!(report.created.len(), 1);
        assert_eq!(
            board.get(Coord::new(2, 0)).map(|t| t.kind()),
            Some(TileKind::Special(SpecialKind::RocketHorizontal))
        );
        assert_eq!(board.get(Coord::new(2, 0)).and_then(|t| t.color()), Some(Color(1)));
        assert_eq!(board.count(|t| t.is_matchable()), 1);
    }

    #[test]
    fn test_round_limit_reports_error() {
        let mut board = Board::from_ascii(&["0 0 0"]);
        let mut rng = BoardRng::new(3);
        let palette = palette();
        let result = CascadeResolver::new(&mut board, &mut rng, &palette)
            .with_round_limit(0)
            .resolve();
        assert_eq!(
            result,
            Err(CoreError::CascadeDidNotStabilize { rounds: 0 })
        );
    }

    #[test]
    fn test_activate_scores_special_rate() {
        let mut board = Board::from_ascii(&["0 1 2 3"]);
        let mut rng = BoardRng::new(3);
        let palette = palette();
        let targets: Vec<Coord> = board.coords().collect();

        let round = CascadeResolver::new(&mut board, &mut rng, &palette).activate(&targets);
        assert!(round.matches.is_empty());
        assert_eq!(round.clear.points, 80);
        assert_eq!(round.spawned.len(), 4);
    }
}
