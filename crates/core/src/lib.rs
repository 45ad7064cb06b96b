//! Core simulation module - pure, deterministic, and testable
//!
//! This crate contains every rule of the tile-matching game: board state, match
//! detection, cascades, special tiles, obstacles, goals and the session state
//! machine. It has **no dependencies** on rendering, input or I/O, making it:
//!
//! - **Deterministic**: the same seed and the same moves replay the same game
//! - **Testable**: boards can be built from ASCII and randomness scripted
//! - **Portable**: the presentation layer only reads events and phase data
//!
//! # Module Structure
//!
//! - [`board`]: grid of tiles plus ice overlay, gravity, refill, initial deal
//! - [`matcher`]: run detection and special-tile derivation
//! - [`special`]: blast areas for activated specials and combos
//! - [`cascade`]: clear / damage / collapse / spawn rounds
//! - [`goals`]: level objectives fed by cascade events
//! - [`moves`]: move probing and reshuffling
//! - [`session`]: phase-driven game state machine
//! - [`level`]: serde level configuration and validation
//! - [`rng`]: injectable seeded randomness
//! - [`scoring`]: points per cleared tile
//! - [`snapshot`]: serializable session snapshot and board hash
//!
//! # Game Rules
//!
//! - **Runs**: 3+ equivalent tiles in a row or column clear
//! - **Specials**: 4 in a run makes a rocket, 5+ a rainbow, crossing runs a bomb
//! - **Activation**: specials fire only when swapped; two specials swapped together combine
//! - **Ice**: absorbs one hit per layer; the tile underneath survives until the last layer goes
//! - **Crates**: lose health when hit or when a neighbouring cell clears
//! - **Stone**: never moves, never breaks, and stops tiles falling through it
//!
//! # Example
//!
//! ```
//! use gem_cascade_core::{GameSession, LevelConfig, MoveOutcome, moves};
//!
//! let mut session = GameSession::new(LevelConfig::default().with_seed(12345)).unwrap();
//! session.start().unwrap();
//! session.acknowledge_all();
//!
//! // Play the first productive swap and let every phase finish
//! let (a, b) = moves::valid_swaps(session.board())[0];
//! let outcome = session.request_move(a, b).unwrap();
//! assert!(matches!(outcome, MoveOutcome::Accepted(_)));
//! session.acknowledge_all();
//!
//! assert_eq!(session.moves_left(), 19);
//! ```

pub mod board;
pub mod cascade;
pub mod error;
pub mod goals;
pub mod level;
pub mod matcher;
pub mod moves;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod special;
pub mod tile;

pub use gem_cascade_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use cascade::{CascadeResolver, ClearReport, Round};
pub use error::{ConfigWarning, CoreError, LevelError, Result};
pub use goals::{Goal, GoalEvent, GoalTracker};
pub use level::{GoalTemplate, LevelConfig, ObstaclePlacement};
pub use matcher::{MatchRun, SpecialSpawn};
pub use rng::{BoardRng, TileRng};
pub use scoring::{clear_score, ClearSource};
pub use session::{GameSession, MoveOutcome, MoveRejection, MoveSummary, Phase};
pub use snapshot::{board_hash, GameSnapshot};
pub use tile::Tile;
