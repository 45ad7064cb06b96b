//! Board module - owns the grid and every mutation of cell contents
//!
//! The board is a `width x height` grid of optional tiles plus a parallel grid of
//! ice layer counts. Both use flat row-major storage (`y * width + x`).
//! Coordinates: `x` grows to the right, `y` grows upward, `y = 0` is the bottom row.
//!
//! Every coordinate-taking operation treats out-of-bounds input as "no tile" or a
//! no-op: speculative probes and real moves share these entry points, so misuse is
//! never fatal here.

use arrayvec::ArrayVec;

use crate::error::{CoreError, LevelError};
use crate::level::LevelConfig;
use crate::matcher;
use crate::rng::TileRng;
use crate::tile::Tile;
use crate::types::{Color, Coord, Fall, ObstacleKind, SpecialKind, TileKind, INITIAL_REWRITE_LIMIT};

/// A board cell: `None` is a hole
pub type Cell = Option<Tile>;

/// Color given to specials parsed by [`Board::from_ascii`]
pub const ASCII_SPECIAL_COLOR: Color = Color(9);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    ice: Vec<u8>,
}

impl Board {
    /// Create an empty board
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width: width as i32,
            height: height as i32,
            cells: vec![None; size],
            ice: vec![0; size],
        }
    }

    /// Deal a board for `config`.
    ///
    /// Cells come from the static layout where it has a color and from the palette
    /// otherwise; obstacle placements are applied on top; finally any run the deal
    /// produced is recolored away.
    pub fn initialize<R: TileRng>(config: &LevelConfig, rng: &mut R) -> Result<Board, LevelError> {
        let warnings = config.validate()?;
        for warning in &warnings {
            tracing::warn!("level config: {}", warning);
        }

        let palette = config.playable_palette();
        let mut board = Board::new(config.width, config.height);

        for y in 0..board.height {
            for x in 0..board.width {
                let pos = Coord::new(x, y);
                let color = config
                    .layout_color(pos)
                    .unwrap_or_else(|| rng.pick_color(&palette));
                board.set(pos, Some(Tile::gem(color)));
            }
        }

        for obstacle in config.obstacles.iter().filter(|o| config.contains(o.pos)) {
            let intensity = obstacle.effective_intensity();
            match obstacle.kind {
                ObstacleKind::Ice => board.set_ice(obstacle.pos, intensity),
                ObstacleKind::Crate => board.set(obstacle.pos, Some(Tile::crate_box(intensity))),
                ObstacleKind::Stone => board.set(obstacle.pos, Some(Tile::stone())),
            };
        }

        board.remove_initial_matches(rng, &palette);
        Ok(board)
    }

    /// Calculate flat index from a coordinate
    #[inline(always)]
    fn index(&self, pos: Coord) -> Option<usize> {
        if !self.is_valid_position(pos) {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_valid_position(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Tile at `pos`; `None` for holes and out-of-bounds coordinates
    pub fn get(&self, pos: Coord) -> Option<&Tile> {
        self.index(pos).and_then(|idx| self.cells[idx].as_ref())
    }

    pub(crate) fn get_mut(&mut self, pos: Coord) -> Option<&mut Tile> {
        let idx = self.index(pos)?;
        self.cells[idx].as_mut()
    }

    /// Set cell at `pos`, stamping the tile with its coordinate.
    /// Returns false if out of bounds.
    pub fn set(&mut self, pos: Coord, cell: Cell) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell.map(|mut tile| {
                    tile.set_pos(pos);
                    tile
                });
                true
            }
            None => false,
        }
    }

    /// Remove and return the tile at `pos` regardless of overlays
    pub fn clear_tile(&mut self, pos: Coord) -> Option<Tile> {
        let idx = self.index(pos)?;
        self.cells[idx].take()
    }

    /// Exchange two cells unconditionally. Returns false if either is out of bounds.
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return false;
        };
        self.cells.swap(ia, ib);
        if let Some(tile) = self.cells[ia].as_mut() {
            tile.set_pos(a);
        }
        if let Some(tile) = self.cells[ib].as_mut() {
            tile.set_pos(b);
        }
        true
    }

    /// Ice layers at `pos` (0 when out of bounds)
    pub fn ice(&self, pos: Coord) -> u8 {
        self.index(pos).map(|idx| self.ice[idx]).unwrap_or(0)
    }

    pub fn set_ice(&mut self, pos: Coord, layers: u8) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.ice[idx] = layers;
                true
            }
            None => false,
        }
    }

    /// Remove one ice layer. Returns the new count, or `None` if there was no ice.
    pub fn crack_ice(&mut self, pos: Coord) -> Option<u8> {
        let idx = self.index(pos)?;
        if self.ice[idx] == 0 {
            return None;
        }
        self.ice[idx] -= 1;
        Some(self.ice[idx])
    }

    /// True when `pos` holds an immovable, indestructible blocker
    pub fn is_blocking(&self, pos: Coord) -> bool {
        self.get(pos).is_some_and(|tile| tile.is_blocking())
    }

    /// In-bounds orthogonal neighbours of `pos`
    pub fn neighbors(&self, pos: Coord) -> ArrayVec<Coord, 4> {
        pos.neighbors()
            .into_iter()
            .filter(|n| self.is_valid_position(*n))
            .collect()
    }

    /// Every coordinate, bottom row first, left to right
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Coord::new(x, y)))
    }

    /// Every tile on the board
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    /// Number of tiles satisfying `pred`
    pub fn count(&self, pred: impl Fn(&Tile) -> bool) -> usize {
        self.tiles().filter(|tile| pred(tile)).count()
    }

    /// Number of empty cells
    pub fn holes(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// Gravity-compact every column.
    ///
    /// Tiles fall past holes; a stone pins itself and resets the fall target for the
    /// tiles above it. Returns one [`Fall`] per tile that moved, bottom-up per column.
    pub fn collapse_columns(&mut self) -> Vec<Fall> {
        let mut falls = Vec::new();

        for x in 0..self.width {
            let mut write_y = 0;
            for y in 0..self.height {
                let idx = (y * self.width + x) as usize;
                match self.cells[idx].as_ref().map(|tile| tile.is_fallable()) {
                    None => {}
                    Some(false) => write_y = y + 1,
                    Some(true) => {
                        if write_y != y {
                            let target = (write_y * self.width + x) as usize;
                            if let Some(mut tile) = self.cells[idx].take() {
                                tile.set_pos(Coord::new(x, write_y));
                                falls.push(Fall {
                                    kind: tile.kind(),
                                    x,
                                    from_y: y,
                                    to_y: write_y,
                                });
                                self.cells[target] = Some(tile);
                            }
                        }
                        write_y += 1;
                    }
                }
            }
        }

        falls
    }

    /// Fill every hole with a freshly dealt gem, flagged as newly spawned
    pub fn spawn_fill<R: TileRng>(&mut self, rng: &mut R, palette: &[Color]) -> Vec<Tile> {
        if palette.is_empty() {
            tracing::warn!("spawn_fill called with an empty palette");
            return Vec::new();
        }

        let mut spawned = Vec::new();
        for x in 0..self.width {
            for y in 0..self.height {
                let idx = (y * self.width + x) as usize;
                if self.cells[idx].is_none() {
                    let mut tile = Tile::gem(rng.pick_color(palette)).mark_spawned();
                    tile.set_pos(Coord::new(x, y));
                    self.cells[idx] = Some(tile);
                    spawned.push(tile);
                }
            }
        }
        spawned
    }

    /// Drop the newly-spawned flag from every tile
    pub fn clear_spawn_flags(&mut self) {
        for tile in self.cells.iter_mut().flatten() {
            tile.settle();
        }
    }

    /// Check that every tile's stored coordinate matches its cell
    pub fn verify_coordinates(&self) -> Result<(), CoreError> {
        for pos in self.coords() {
            if let Some(tile) = self.get(pos) {
                if tile.pos() != pos {
                    tracing::error!("tile at {} believes it is at {}", pos, tile.pos());
                    return Err(CoreError::CoordinateDesync {
                        expected: pos,
                        found: tile.pos(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Recolor gems until no run remains, within `INITIAL_REWRITE_LIMIT` passes.
    /// Returns false (and logs) if the ceiling was hit with runs still present.
    pub fn remove_initial_matches<R: TileRng>(&mut self, rng: &mut R, palette: &[Color]) -> bool {
        if palette.is_empty() {
            return !matcher::has_any_match(self);
        }

        for _ in 0..INITIAL_REWRITE_LIMIT {
            let runs = matcher::find_matches(self);
            if runs.is_empty() {
                return true;
            }
            for run in &runs {
                for &pos in &run.positions {
                    let Some(TileKind::Gem(current)) = self.get(pos).map(|t| t.kind()) else {
                        continue;
                    };
                    // An earlier rewrite in this pass may already have broken the run
                    if !matcher::is_part_of_match(self, pos) {
                        continue;
                    }
                    let color = self.substitute_color(pos, current, rng, palette);
                    self.set(pos, Some(Tile::gem(color)));
                }
            }
        }

        let clean = !matcher::has_any_match(self);
        if !clean {
            tracing::warn!(
                "board still has matches after {} rewrite passes",
                INITIAL_REWRITE_LIMIT
            );
        }
        clean
    }

    /// Pick a replacement for the gem at `pos`: prefer a color no neighbour has,
    /// then any color that does not complete a run, then anything.
    fn substitute_color<R: TileRng>(
        &mut self,
        pos: Coord,
        current: Color,
        rng: &mut R,
        palette: &[Color],
    ) -> Color {
        let neighbour_colors: ArrayVec<Color, 4> = self
            .neighbors(pos)
            .iter()
            .filter_map(|n| self.get(*n).and_then(|tile| tile.color()))
            .collect();

        let isolated: Vec<Color> = palette
            .iter()
            .copied()
            .filter(|c| *c != current && !neighbour_colors.contains(c))
            .collect();
        if !isolated.is_empty() {
            return isolated[rng.next_index(isolated.len())];
        }

        let original = self.get(pos).copied();
        let mut safe = Vec::new();
        for &color in palette.iter().filter(|c| **c != current) {
            self.set(pos, Some(Tile::gem(color)));
            if !matcher::is_part_of_match(self, pos) {
                safe.push(color);
            }
        }
        self.set(pos, original);

        if !safe.is_empty() {
            return safe[rng.next_index(safe.len())];
        }
        rng.pick_color(palette)
    }

    /// Parse a board from text rows, top row first.
    ///
    /// `0`-`9` gems, `.` hole, `#` stone, `c`/`C` crate with 1/2 health,
    /// `H`/`V` rockets, `B` bomb, `*` rainbow (specials carry [`ASCII_SPECIAL_COLOR`]).
    /// Whitespace is ignored; unknown characters become holes.
    ///
    /// ```
    /// use gem_cascade_core::Board;
    /// use gem_cascade_types::{Coord, TileKind, Color};
    ///
    /// let board = Board::from_ascii(&[
    ///     "0 1 2",
    ///     "# . c",
    /// ]);
    /// assert_eq!(board.width(), 3);
    /// assert_eq!(board.get(Coord::new(0, 1)).map(|t| t.kind()), Some(TileKind::Gem(Color(0))));
    /// assert_eq!(board.get(Coord::new(0, 0)).map(|t| t.kind()), Some(TileKind::Stone));
    /// assert!(board.get(Coord::new(1, 0)).is_none());
    /// ```
    pub fn from_ascii(rows: &[&str]) -> Board {
        let parsed: Vec<Vec<char>> = rows
            .iter()
            .map(|row| row.chars().filter(|c| !c.is_whitespace()).collect())
            .collect();
        let width = parsed.iter().map(|row| row.len()).max().unwrap_or(0);
        let height = parsed.len();

        let mut board = Board::new(width as u16, height as u16);
        for (row, chars) in parsed.iter().enumerate() {
            let y = (height - 1 - row) as i32;
            for (x, ch) in chars.iter().enumerate() {
                let tile = match ch {
                    '0'..='9' => Some(Tile::gem(Color(*ch as u8 - b'0'))),
                    '#' => Some(Tile::stone()),
                    'c' => Some(Tile::crate_box(1)),
                    'C' => Some(Tile::crate_box(2)),
                    'H' => Some(Tile::special(
                        SpecialKind::RocketHorizontal,
                        ASCII_SPECIAL_COLOR,
                    )),
                    'V' => Some(Tile::special(
                        SpecialKind::RocketVertical,
                        ASCII_SPECIAL_COLOR,
                    )),
                    'B' => Some(Tile::special(SpecialKind::Bomb, ASCII_SPECIAL_COLOR)),
                    '*' => Some(Tile::special(SpecialKind::Rainbow, ASCII_SPECIAL_COLOR)),
                    _ => None,
                };
                board.set(Coord::new(x as i32, y), tile);
            }
        }
        board
    }

    /// Render the board in the [`Board::from_ascii`] alphabet, top row first
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let ch = match self.get(Coord::new(x, y)).map(|t| t.kind()) {
                    None => '.',
                    Some(TileKind::Gem(Color(c))) if c < 10 => (b'0' + c) as char,
                    Some(TileKind::Gem(_)) => '?',
                    Some(TileKind::Stone) => '#',
                    Some(TileKind::Crate { health: 1 }) => 'c',
                    Some(TileKind::Crate { .. }) => 'C',
                    Some(TileKind::Special(SpecialKind::RocketHorizontal)) => 'H',
                    Some(TileKind::Special(SpecialKind::RocketVertical)) => 'V',
                    Some(TileKind::Special(SpecialKind::Bomb)) => 'B',
                    Some(TileKind::Special(SpecialKind::Rainbow)) => '*',
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}
