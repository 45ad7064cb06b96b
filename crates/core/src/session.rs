//! Game session - the state machine that owns a level in play
//!
//! A session owns the board, RNG, goals, score and move counter. A move is
//! computed synchronously from swap to settled board, and each step is queued
//! as a [`Phase`] for the presentation layer. The session sits in the state of
//! the phase at the front of the queue, and only returns to `WaitingForInput`
//! (or a terminal state) once every phase has been acknowledged.
//!
//! ```
//! use gem_cascade_core::{GameSession, LevelConfig, MoveOutcome};
//! use gem_cascade_types::{Coord, SessionState};
//!
//! let mut session = GameSession::new(LevelConfig::default().with_seed(7)).unwrap();
//! session.start().unwrap();
//! session.acknowledge_all();
//! assert_eq!(session.state(), SessionState::WaitingForInput);
//!
//! // Non-adjacent requests are rejected without using a move
//! let outcome = session.request_move(Coord::new(0, 0), Coord::new(2, 0)).unwrap();
//! assert!(matches!(outcome, MoveOutcome::Rejected(_)));
//! assert_eq!(session.moves_left(), 20);
//! ```

use std::collections::VecDeque;

use crate::board::Board;
use crate::cascade::{CascadeResolver, ClearReport, Round};
use crate::error::{CoreError, Result};
use crate::goals::{Goal, GoalTracker};
use crate::level::LevelConfig;
use crate::matcher::{self, MatchRun};
use crate::moves;
use crate::rng::{BoardRng, TileRng};
use crate::snapshot::GameSnapshot;
use crate::special;
use crate::tile::Tile;
use crate::types::{Color, Coord, Fall, GameEvent, SessionState};

/// One presentable step of a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Tiles exchanged; `reverted` when the swap produced nothing and was undone
    Swap { a: Coord, b: Coord, reverted: bool },
    /// Runs found at the start of a cascade round
    Matches { runs: Vec<MatchRun> },
    Clear(ClearReport),
    Collapse { falls: Vec<Fall> },
    Spawn { tiles: Vec<Tile> },
    /// Board rearranged because no valid move remained
    Shuffle { tiles: Vec<Tile> },
}

impl Phase {
    /// Session state shown while this phase is presented
    pub fn state(&self) -> SessionState {
        match self {
            Phase::Swap { .. } => SessionState::Swapping,
            Phase::Matches { .. } => SessionState::CheckingMatches,
            Phase::Clear(_) => SessionState::ClearingMatches,
            Phase::Collapse { .. } | Phase::Spawn { .. } => SessionState::Collapsing,
            Phase::Shuffle { .. } => SessionState::Shuffling,
        }
    }
}

/// Why a move request was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    OutOfBounds,
    NotAdjacent,
    /// An endpoint is empty or holds a blocker
    Immovable,
}

/// Result of an accepted move once the cascade has been computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSummary {
    pub a: Coord,
    pub b: Coord,
    pub special: bool,
    pub rounds: usize,
    pub cleared: usize,
    pub points: u32,
    pub shuffled: bool,
    /// State the session settles in after the phases are acknowledged
    pub outcome: SessionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not accepting input right now
    Ignored,
    Rejected(MoveRejection),
    /// Swap made no match; no move was used
    Reverted,
    Accepted(MoveSummary),
}

/// One playthrough of a level
#[derive(Debug, Clone)]
pub struct GameSession<R: TileRng = BoardRng> {
    config: LevelConfig,
    palette: Vec<Color>,
    board: Board,
    rng: R,
    goals: GoalTracker,
    state: SessionState,
    settled: SessionState,
    phases: VecDeque<Phase>,
    events: Vec<GameEvent>,
    moves_left: u32,
    score: u32,
    episode_id: u32,
}

impl GameSession<BoardRng> {
    /// Create a session seeded from the level's seed, or from entropy if it has none
    pub fn new(config: LevelConfig) -> Result<Self> {
        let rng = config
            .seed
            .map(BoardRng::new)
            .unwrap_or_else(BoardRng::from_entropy);
        Self::with_rng(config, rng)
    }

    /// Seed of the session's RNG stream
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }
}

impl<R: TileRng> GameSession<R> {
    pub fn with_rng(config: LevelConfig, mut rng: R) -> Result<Self> {
        let board = Board::initialize(&config, &mut rng)?;
        Ok(Self::assemble(config, board, rng))
    }

    /// Start from a prepared board instead of dealing one
    pub fn with_board(config: LevelConfig, board: Board, rng: R) -> Result<Self> {
        for warning in config.validate()? {
            tracing::warn!("level config: {}", warning);
        }
        Ok(Self::assemble(config, board, rng))
    }

    fn assemble(config: LevelConfig, board: Board, rng: R) -> Self {
        Self {
            palette: config.playable_palette(),
            goals: GoalTracker::from_templates(&config.goals),
            moves_left: config.move_limit,
            config,
            board,
            rng,
            state: SessionState::Initializing,
            settled: SessionState::Initializing,
            phases: VecDeque::new(),
            events: Vec::new(),
            score: 0,
            episode_id: 0,
        }
    }

    /// Leave `Initializing`. A dealt board with no valid move is shuffled, and the
    /// session waits in `Shuffling` until that phase is acknowledged.
    pub fn start(&mut self) -> Result<()> {
        if self.state != SessionState::Initializing {
            return Ok(());
        }
        self.board.clear_spawn_flags();
        self.settled = SessionState::WaitingForInput;
        if !moves::has_valid_moves(&self.board) {
            tracing::debug!("initial board has no valid move; shuffling");
            if let Err(err) = self.shuffle() {
                return Err(self.fail(err));
            }
            self.transition(SessionState::Shuffling);
            return Ok(());
        }
        self.transition(SessionState::WaitingForInput);
        Ok(())
    }

    /// Deal the level again: fresh board, goals, score and move counter.
    /// The RNG stream continues, so each episode gets a different board.
    pub fn restart(&mut self) -> Result<()> {
        self.board = Board::initialize(&self.config, &mut self.rng)?;
        self.goals.reset();
        self.phases.clear();
        self.episode_id += 1;
        if self.moves_left != self.config.move_limit {
            self.moves_left = self.config.move_limit;
            self.events.push(GameEvent::MovesChanged {
                remaining: self.moves_left,
            });
        }
        if self.score != 0 {
            self.score = 0;
            self.events.push(GameEvent::ScoreChanged { score: 0 });
        }
        self.settled = SessionState::Initializing;
        self.transition(SessionState::Initializing);
        self.start()
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::WaitingForInput {
            return false;
        }
        self.settled = SessionState::Paused;
        self.transition(SessionState::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Paused {
            return false;
        }
        self.settled = SessionState::WaitingForInput;
        self.transition(SessionState::WaitingForInput);
        true
    }

    /// Handle a move request from the input layer.
    ///
    /// Invalid or badly timed requests are reported through [`MoveOutcome`], never
    /// as errors. `Err` means an invariant broke while resolving the move; the
    /// session is then over.
    pub fn request_move(&mut self, a: Coord, b: Coord) -> Result<MoveOutcome> {
        if !self.state.accepts_input() {
            return Ok(MoveOutcome::Ignored);
        }
        if !self.board.is_valid_position(a) || !self.board.is_valid_position(b) {
            return Ok(MoveOutcome::Rejected(MoveRejection::OutOfBounds));
        }
        if !a.is_adjacent(b) {
            return Ok(MoveOutcome::Rejected(MoveRejection::NotAdjacent));
        }
        if !moves::is_swappable(&self.board, a) || !moves::is_swappable(&self.board, b) {
            return Ok(MoveOutcome::Rejected(MoveRejection::Immovable));
        }

        let special_move = [a, b]
            .iter()
            .any(|pos| self.board.get(*pos).is_some_and(|t| t.is_special()));

        self.board.clear_spawn_flags();
        self.board.swap(a, b);
        self.events.push(GameEvent::TilesSwapped { a, b });

        if !special_move
            && !matcher::is_part_of_match(&self.board, a)
            && !matcher::is_part_of_match(&self.board, b)
        {
            self.board.swap(a, b);
            self.events.push(GameEvent::TilesSwapped { a: b, b: a });
            self.phases.push_back(Phase::Swap {
                a,
                b,
                reverted: true,
            });
            self.settled = SessionState::WaitingForInput;
            self.transition(SessionState::Swapping);
            tracing::debug!(%a, %b, "swap reverted");
            return Ok(MoveOutcome::Reverted);
        }

        self.moves_left = self.moves_left.saturating_sub(1);
        self.events.push(GameEvent::MovesChanged {
            remaining: self.moves_left,
        });
        self.phases.push_back(Phase::Swap {
            a,
            b,
            reverted: false,
        });

        let targets = if special_move {
            special::move_targets(&self.board, a, b)
        } else {
            None
        };

        let resolved = {
            let mut resolver = CascadeResolver::new(&mut self.board, &mut self.rng, &self.palette);
            let activation = targets.as_deref().map(|t| resolver.activate(t));
            resolver.resolve().map(|rounds| (activation, rounds))
        };
        let (activation, rounds) = match resolved {
            Ok(resolved) => resolved,
            Err(err) => return Err(self.fail(err)),
        };

        let score_before = self.score;
        let mut cleared = 0;
        let round_count = rounds.len() + usize::from(activation.is_some());
        for round in activation.into_iter().chain(rounds) {
            cleared += round.clear.cleared.len();
            self.record_round(round);
        }

        if let Err(err) = self.board.verify_coordinates() {
            return Err(self.fail(err));
        }

        let (outcome, shuffled) = match self.evaluate() {
            Ok(next) => next,
            Err(err) => return Err(self.fail(err)),
        };
        self.settled = outcome;
        self.transition(SessionState::Swapping);

        let summary = MoveSummary {
            a,
            b,
            special: special_move,
            rounds: round_count,
            cleared,
            points: self.score - score_before,
            shuffled,
            outcome,
        };
        tracing::debug!(
            %a,
            %b,
            special = special_move,
            rounds = round_count,
            cleared,
            points = summary.points,
            moves_left = self.moves_left,
            "move resolved"
        );
        Ok(MoveOutcome::Accepted(summary))
    }

    /// Settled-board checks, in order: win, out of moves, no valid move (shuffle)
    fn evaluate(&mut self) -> Result<(SessionState, bool)> {
        if self.goals.all_complete() {
            return Ok((SessionState::LevelComplete, false));
        }
        if self.moves_left == 0 {
            return Ok((SessionState::GameOver, false));
        }
        if !moves::has_valid_moves(&self.board) {
            self.shuffle()?;
            return Ok((SessionState::WaitingForInput, true));
        }
        Ok((SessionState::WaitingForInput, false))
    }

    /// Reshuffle the board and queue the result as a `Shuffle` phase
    fn shuffle(&mut self) -> Result<()> {
        let tiles = moves::reshuffle(&mut self.board, &mut self.rng, &self.palette)?;
        for tile in &tiles {
            self.events.push(GameEvent::TileChanged {
                pos: tile.pos(),
                kind: tile.kind(),
            });
        }
        tracing::debug!(changed = tiles.len(), "board shuffled");
        self.phases.push_back(Phase::Shuffle { tiles });
        Ok(())
    }

    /// Apply one round's score, goals and events, and queue its phases
    fn record_round(&mut self, round: Round) {
        let Round {
            matches,
            clear,
            falls,
            spawned,
        } = round;

        if !matches.is_empty() {
            self.phases.push_back(Phase::Matches { runs: matches });
        }

        for tile in &clear.cleared {
            self.events.push(GameEvent::TileCleared {
                pos: tile.pos,
                kind: tile.kind,
            });
        }
        for hit in &clear.ice {
            self.events.push(GameEvent::IceChanged {
                pos: hit.pos,
                layers: hit.layers,
            });
        }
        for hit in &clear.crates {
            self.events.push(if hit.health == 0 {
                GameEvent::CrateDestroyed { pos: hit.pos }
            } else {
                GameEvent::CrateDamaged {
                    pos: hit.pos,
                    health: hit.health,
                }
            });
        }
        for tile in &clear.created {
            let replaced_live_tile =
                !clear.cleared_at(tile.pos()) && !clear.crates.iter().any(|c| c.pos == tile.pos());
            self.events.push(if replaced_live_tile {
                GameEvent::TileChanged {
                    pos: tile.pos(),
                    kind: tile.kind(),
                }
            } else {
                GameEvent::TileCreated {
                    pos: tile.pos(),
                    kind: tile.kind(),
                }
            });
        }

        if clear.points > 0 {
            self.score = self.score.saturating_add(clear.points);
            self.events.push(GameEvent::ScoreChanged { score: self.score });
        }
        for event in &clear.goal_events {
            for index in self.goals.apply(event) {
                self.push_goal_progress(index);
            }
        }
        for index in self.goals.apply_score(self.score) {
            self.push_goal_progress(index);
        }
        self.phases.push_back(Phase::Clear(clear));

        if !falls.is_empty() {
            self.events.push(GameEvent::TilesFell {
                falls: falls.clone(),
            });
            self.phases.push_back(Phase::Collapse { falls });
        }
        if !spawned.is_empty() {
            for tile in &spawned {
                self.events.push(GameEvent::TileCreated {
                    pos: tile.pos(),
                    kind: tile.kind(),
                });
            }
            self.phases.push_back(Phase::Spawn { tiles: spawned });
        }
    }

    fn push_goal_progress(&mut self, index: usize) {
        if let Some(goal) = self.goals.goals().get(index) {
            self.events.push(GameEvent::GoalProgress {
                index,
                current: goal.current,
                target: goal.target,
            });
        }
    }

    /// Invariant violation: drop pending phases and end the session
    fn fail(&mut self, err: CoreError) -> CoreError {
        tracing::error!("session aborted: {}", err);
        self.phases.clear();
        self.settled = SessionState::GameOver;
        self.transition(SessionState::GameOver);
        err
    }

    fn transition(&mut self, to: SessionState) {
        if self.state == to {
            return;
        }
        self.events.push(GameEvent::StateChanged {
            from: self.state,
            to,
        });
        match to {
            SessionState::LevelComplete => {
                self.events.push(GameEvent::LevelComplete { score: self.score })
            }
            SessionState::GameOver => self.events.push(GameEvent::GameOver { score: self.score }),
            _ => {}
        }
        self.state = to;
    }

    /// Phase currently being presented
    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases.front()
    }

    pub fn pending_phases(&self) -> usize {
        self.phases.len()
    }

    /// Presentation finished the current phase. Returns it, or `None` if idle.
    pub fn acknowledge_phase(&mut self) -> Option<Phase> {
        let done = self.phases.pop_front()?;
        let next = self
            .phases
            .front()
            .map(Phase::state)
            .unwrap_or(self.settled);
        self.transition(next);
        Some(done)
    }

    /// Acknowledge every queued phase (headless play)
    pub fn acknowledge_all(&mut self) -> Vec<Phase> {
        std::iter::from_fn(|| self.acknowledge_phase()).collect()
    }

    /// Drain accumulated events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// State the session will be in once the phase queue drains
    pub fn settled_state(&self) -> SessionState {
        self.settled
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn goals(&self) -> &[Goal] {
        self.goals.goals()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn has_valid_moves(&self) -> bool {
        moves::has_valid_moves(&self.board)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            score: self.score,
            moves_left: self.moves_left,
            state: self.state,
            goals: self.goals.goals().to_vec(),
            episode_id: self.episode_id,
            ..GameSnapshot::from_board(&self.board)
        }
    }
}
