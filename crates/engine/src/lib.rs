//! Engine helpers built on the simulation core
//!
//! - [`hint`]: ranks valid swaps by how much they clear
//! - [`autoplay`]: drives a session headlessly with the best hint each turn

pub mod autoplay;
pub mod hint;

pub use autoplay::{run_to_end, PlayReport};
pub use hint::{rank_moves, suggest_move, Hint};
