use serde::Serialize;

use crate::board::Board;
use crate::goals::Goal;
use crate::types::{Coord, SessionState, TileKind};

/// Serializable picture of a session at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub width: i32,
    pub height: i32,
    /// Row-major, bottom row first
    pub cells: Vec<Option<TileKind>>,
    pub ice: Vec<u8>,
    pub board_hash: u64,
    pub score: u32,
    pub moves_left: u32,
    pub state: SessionState,
    pub goals: Vec<Goal>,
    pub episode_id: u32,
}

impl GameSnapshot {
    /// Board portion of a snapshot; session fields start zeroed
    pub fn from_board(board: &Board) -> Self {
        Self {
            width: board.width(),
            height: board.height(),
            cells: board.coords().map(|pos| board.get(pos).map(|t| t.kind())).collect(),
            ice: board.coords().map(|pos| board.ice(pos)).collect(),
            board_hash: board_hash(board),
            score: 0,
            moves_left: 0,
            state: SessionState::Initializing,
            goals: Vec::new(),
            episode_id: 0,
        }
    }

    pub fn cell(&self, pos: Coord) -> Option<TileKind> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        self.cells[(pos.y * self.width + pos.x) as usize]
    }

    pub fn playable(&self) -> bool {
        self.state.accepts_input()
    }
}

/// Stable 64-bit FNV-1a hash of the board: dimensions, then per cell the
/// two-byte tile code (`[0, 0]` for a hole) and the ice layer count
pub fn board_hash(board: &Board) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x00000100000001B3;

    let header = [board.width() as u8, board.height() as u8];
    let cells = board.coords().flat_map(|pos| {
        let [tag, payload] = board.get(pos).map_or([0, 0], |t| t.kind().code());
        [tag, payload, board.ice(pos)]
    });

    header.into_iter().chain(cells).fold(OFFSET_BASIS, |h, b| {
        (h ^ b as u64).wrapping_mul(PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Tile;
    use crate::types::Color;

    #[test]
    fn test_hash_tracks_tiles_and_ice() {
        let mut board = Board::from_ascii(&["01", "2#"]);
        let base = board_hash(&board);
        assert_eq!(base, board_hash(&board.clone()));

        board.set_ice(Coord::new(0, 0), 1);
        let iced = board_hash(&board);
        assert_ne!(base, iced);

        board.swap(Coord::new(0, 1), Coord::new(1, 1));
        assert_ne!(iced, board_hash(&board));
    }

    #[test]
    fn test_hash_separates_high_colors() {
        let mut board = Board::new(1, 1);
        board.set(Coord::new(0, 0), Some(Tile::gem(Color(240))));
        let low = board_hash(&board);
        board.set(Coord::new(0, 0), Some(Tile::gem(Color(250))));
        assert_ne!(low, board_hash(&board));
    }

    #[test]
    fn test_snapshot_cells() {
        let board = Board::from_ascii(&["0.", "c#"]);
        let snap = GameSnapshot::from_board(&board);
        assert_eq!(snap.cells.len(), 4);
        assert_eq!(snap.cell(Coord::new(0, 0)), Some(TileKind::Crate { health: 1 }));
        assert_eq!(snap.cell(Coord::new(1, 1)), None);
        assert_eq!(snap.cell(Coord::new(5, 5)), None);
        assert_eq!(snap.board_hash, board_hash(&board));
    }
}
