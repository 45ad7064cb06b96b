//! Board tests - bounds, swaps, gravity, refill and the initial deal

mod common;

use gem_cascade::core::{matcher, Board, BoardRng, LevelConfig, Tile};
use gem_cascade::types::{Color, Coord, ObstacleKind, TileKind};

#[test]
fn test_board_new_empty() {
    let board = Board::new(6, 9);
    assert_eq!(board.width(), 6);
    assert_eq!(board.height(), 9);
    assert_eq!(board.holes(), 54);
    for pos in board.coords() {
        assert!(board.is_valid_position(pos));
        assert!(board.get(pos).is_none());
    }
}

#[test]
fn test_board_get_out_of_bounds() {
    let board = common::pattern_board(4, 4, &[]);

    assert!(board.get(Coord::new(-1, 0)).is_none());
    assert!(board.get(Coord::new(0, -1)).is_none());
    assert!(board.get(Coord::new(4, 0)).is_none());
    assert!(board.get(Coord::new(0, 4)).is_none());
    assert_eq!(board.ice(Coord::new(9, 9)), 0);
}

#[test]
fn test_board_set_out_of_bounds_is_noop() {
    let mut board = common::pattern_board(4, 4, &[]);
    let before = board.clone();

    assert!(!board.set(Coord::new(-1, 0), Some(Tile::gem(Color(0)))));
    assert!(!board.swap(Coord::new(0, 0), Coord::new(0, 4)));
    assert!(board.clear_tile(Coord::new(4, 4)).is_none());
    assert!(!board.set_ice(Coord::new(4, 0), 2));
    assert_eq!(board, before);
}

#[test]
fn test_swap_updates_coordinates_and_is_an_involution() {
    let mut board = common::pattern_board(5, 5, &[]);
    let before = board.clone();
    let (a, b) = (Coord::new(1, 1), Coord::new(1, 2));
    let kind_a = board.get(a).map(|t| t.kind());

    assert!(board.swap(a, b));
    assert_eq!(board.get(b).map(|t| t.kind()), kind_a);
    assert_eq!(board.get(b).map(|t| t.pos()), Some(b));
    assert!(board.verify_coordinates().is_ok());

    board.swap(a, b);
    assert_eq!(board, before);
}

#[test]
fn test_ice_survives_swaps() {
    let mut board = common::pattern_board(3, 3, &[]);
    board.set_ice(Coord::new(0, 0), 2);
    board.swap(Coord::new(0, 0), Coord::new(1, 0));
    assert_eq!(board.ice(Coord::new(0, 0)), 2);
    assert_eq!(board.ice(Coord::new(1, 0)), 0);
}

#[test]
fn test_collapse_reports_displacements() {
    let mut board = Board::from_ascii(&[
        "0 1", //
        ". 2", //
        "3 .", //
        ". 4", //
    ]);
    let falls = board.collapse_columns();

    assert_eq!(board.to_ascii(), "..\n.1\n02\n34\n");
    assert_eq!(falls.len(), 4);
    assert!(falls.iter().all(|f| f.from_y > f.to_y));
    let moved_zero = falls
        .iter()
        .find(|f| f.kind == TileKind::Gem(Color(0)))
        .unwrap();
    assert_eq!((moved_zero.x, moved_zero.from_y, moved_zero.to_y), (0, 3, 1));
}

#[test]
fn test_collapse_never_passes_stone() {
    let mut board = Board::from_ascii(&[
        "2 3", //
        ". .", //
        "# c", //
        ". .", //
        "1 .", //
    ]);
    board.collapse_columns();

    // Column 0: 2 lands on the stone, 1 stays at the bottom with a hole above it
    assert_eq!(board.to_ascii(), "..\n2.\n#.\n.3\n1c\n");
}

#[test]
fn test_collapse_is_idempotent() {
    let mut board = Board::from_ascii(&[
        "1 . 2", //
        ". # .", //
        "0 . .", //
        ". 3 .", //
    ]);
    assert!(!board.collapse_columns().is_empty());
    assert!(board.collapse_columns().is_empty());
}

#[test]
fn test_spawn_fill_leaves_no_holes() {
    let mut board = Board::from_ascii(&[
        ". . .", //
        "0 # .", //
        ". . 1", //
    ]);
    let mut rng = BoardRng::new(5);
    board.collapse_columns();
    let spawned = board.spawn_fill(&mut rng, &Color::palette(3));

    assert_eq!(spawned.len(), 6);
    assert_eq!(board.holes(), 0);
    assert!(spawned.iter().all(|t| t.is_newly_spawned()));
    assert!(board.verify_coordinates().is_ok());
}

#[test]
fn test_initialize_applies_obstacles() {
    let config = LevelConfig::new(6, 6, Color::palette(4))
        .with_obstacle(Coord::new(0, 0), ObstacleKind::Stone, 1)
        .with_obstacle(Coord::new(1, 1), ObstacleKind::Crate, 2)
        .with_obstacle(Coord::new(2, 2), ObstacleKind::Ice, 3)
        .with_obstacle(Coord::new(10, 10), ObstacleKind::Ice, 1);
    let mut rng = BoardRng::new(17);
    let board = Board::initialize(&config, &mut rng).unwrap();

    assert_eq!(
        board.get(Coord::new(0, 0)).map(|t| t.kind()),
        Some(TileKind::Stone)
    );
    assert_eq!(
        board.get(Coord::new(1, 1)).map(|t| t.kind()),
        Some(TileKind::Crate { health: 2 })
    );
    assert_eq!(board.ice(Coord::new(2, 2)), 3);
    assert!(board.get(Coord::new(2, 2)).is_some_and(|t| t.is_matchable()));
    assert_eq!(board.holes(), 0);
    assert!(!matcher::has_any_match(&board));
}

#[test]
fn test_initialize_uses_layout_where_given() {
    let layout = vec![
        vec![Some(Color(2)), Some(Color(0)), None],
        vec![Some(Color(0)), Some(Color(2)), None],
        vec![Some(Color(2)), Some(Color(0)), None],
    ];
    let config = LevelConfig::new(3, 3, Color::palette(3)).with_layout(layout);
    let mut rng = BoardRng::new(2);
    let board = Board::initialize(&config, &mut rng).unwrap();

    // Columns 0 and 1 are fixed and have no runs of their own; column 2 is random
    for (y, row) in config.layout.as_ref().unwrap().iter().enumerate() {
        for x in 0..2 {
            let pos = Coord::new(x as i32, y as i32);
            assert_eq!(board.get(pos).and_then(|t| t.color()), row[x]);
        }
    }
}

#[test]
fn test_initialize_rejects_small_palette() {
    let config = LevelConfig::new(5, 5, Color::palette(2));
    let mut rng = BoardRng::new(1);
    assert!(Board::initialize(&config, &mut rng).is_err());
}
