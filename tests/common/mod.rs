//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;

use gem_cascade::core::{Board, BoardRng, Tile, TileRng};
use gem_cascade::types::{Color, Coord};

/// Replays scripted indices, then falls back to a seeded stream
pub struct ScriptedRng {
    script: VecDeque<usize>,
    fallback: BoardRng,
}

impl ScriptedRng {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: BoardRng::new(0xC0FFEE),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl TileRng for ScriptedRng {
    fn next_index(&mut self, len: usize) -> usize {
        match self.script.pop_front() {
            Some(index) => index % len.max(1),
            None => self.fallback.next_index(len),
        }
    }
}

/// Color of the 4-color pattern that has no runs and no productive swap
pub fn dead_color(x: i32, y: i32) -> u8 {
    ((x + 2 * (y % 2)) % 4) as u8
}

/// `width x height` board in the dead pattern, with `overrides` applied
pub fn pattern_board(width: u16, height: u16, overrides: &[((i32, i32), u8)]) -> Board {
    let mut board = Board::new(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            board.set(Coord::new(x, y), Some(Tile::gem(Color(dead_color(x, y)))));
        }
    }
    for &((x, y), color) in overrides {
        board.set(Coord::new(x, y), Some(Tile::gem(Color(color))));
    }
    board
}
