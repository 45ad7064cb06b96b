//! RNG module - seeded randomness for dealing and refilling tiles
//!
//! Every random decision the core makes (initial deal, refill colors, shuffles)
//! goes through the [`TileRng`] trait so tests can inject a scripted source.
//! [`BoardRng`] is the production implementation, a ChaCha8 stream seeded from
//! a `u64` so the same seed always replays the same game.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::Color;

/// Source of random indices for the board.
pub trait TileRng {
    /// Random value in `[0, len)`. `len` is always non-zero.
    fn next_index(&mut self, len: usize) -> usize;

    /// Pick a color from a non-empty palette
    fn pick_color(&mut self, palette: &[Color]) -> Color {
        palette[self.next_index(palette.len())]
    }

    /// Shuffle a slice using Fisher-Yates
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

/// Seeded ChaCha8 generator
#[derive(Debug, Clone)]
pub struct BoardRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl BoardRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create an RNG from a fresh random seed (the seed is still recorded)
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// The seed this stream started from
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl TileRng for BoardRng {
    fn next_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len.max(1))
    }
}

impl Default for BoardRng {
    fn default() -> Self {
        Self::new(1)
    }
}
