//! Level files: parsing, validation and the board they deal

use gem_cascade::core::{Board, BoardRng, ConfigWarning, GameSession, LevelConfig, LevelError};
use gem_cascade::types::{Color, Coord, GoalKind, ObstacleKind, SessionState, TileKind};

const SAMPLE: &str = include_str!("../levels/sample.json");

fn sample() -> LevelConfig {
    serde_json::from_str(SAMPLE).unwrap()
}

#[test]
fn test_sample_level_parses() {
    let config = sample();
    assert_eq!((config.width, config.height), (7, 9));
    assert_eq!(config.palette.len(), 5);
    assert_eq!(config.move_limit, 20);
    assert_eq!(config.seed, Some(11));
    assert_eq!(config.goals.len(), 3);
    assert_eq!(config.goals[0].kind, GoalKind::CollectColor);
    assert_eq!(config.goals[0].color, Some(Color(2)));
    assert_eq!(config.goals[1].color, None);
    assert_eq!(config.obstacles.len(), 6);
    assert_eq!(config.obstacles[3].kind, ObstacleKind::Stone);
    assert!(config.validate().unwrap().is_empty());
}

#[test]
fn test_sample_level_board_has_obstacles() {
    let config = sample();
    let board = Board::initialize(&config, &mut BoardRng::new(11)).unwrap();

    assert_eq!(board.ice(Coord::new(1, 1)), 2);
    assert_eq!(board.ice(Coord::new(3, 1)), 3);
    assert!(board.is_blocking(Coord::new(3, 4)));
    assert_eq!(
        board.get(Coord::new(0, 6)).map(|t| t.kind()),
        Some(TileKind::Crate { health: 2 })
    );
    assert_eq!(board.holes(), 0);
    assert!(board.get(Coord::new(1, 1)).is_some_and(|t| t.is_matchable()));
}

#[test]
fn test_sample_level_session() {
    let mut session = GameSession::new(sample()).unwrap();
    assert_eq!(session.seed(), 11);
    session.start().unwrap();
    session.acknowledge_all();

    assert_eq!(session.state(), SessionState::WaitingForInput);
    assert_eq!(session.goals().len(), 3);
    assert!(session.goals().iter().all(|g| g.current == 0));
    assert!(session.has_valid_moves());
}

#[test]
fn test_defaults_fill_missing_fields() {
    let config: LevelConfig =
        serde_json::from_str(r#"{ "width": 6, "height": 6, "palette": [0, 1, 2] }"#).unwrap();
    assert_eq!(config.move_limit, 20);
    assert!(config.goals.is_empty());
    assert!(config.obstacles.is_empty());
    assert!(config.layout.is_none());
    assert!(config.seed.is_none());
}

#[test]
fn test_hard_errors() {
    assert!(matches!(
        LevelConfig::new(0, 8, Color::palette(4)).validate(),
        Err(LevelError::InvalidDimensions { .. })
    ));
    assert!(matches!(
        LevelConfig::new(8, 8, vec![Color(1), Color(1), Color(2)]).validate(),
        Err(LevelError::PaletteTooSmall(2))
    ));
    assert!(matches!(
        LevelConfig::default().with_moves(0).validate(),
        Err(LevelError::NoMoves)
    ));
    assert!(matches!(
        LevelConfig::default()
            .with_goal(GoalKind::CollectColor, None, 10)
            .validate(),
        Err(LevelError::MissingGoalColor { index: 0 })
    ));
    assert!(matches!(
        LevelConfig::default()
            .with_goal(GoalKind::BreakIce, None, 0)
            .validate(),
        Err(LevelError::EmptyGoal { index: 0 })
    ));
}

#[test]
fn test_recoverable_problems_are_warnings() {
    let config = LevelConfig::default()
        .with_obstacle(Coord::new(9, 9), ObstacleKind::Ice, 1)
        .with_obstacle(Coord::new(2, 2), ObstacleKind::Ice, 7);
    let warnings = config.validate().unwrap();

    assert_eq!(warnings.len(), 2);
    assert!(matches!(
        warnings[0],
        ConfigWarning::ObstacleOutOfBounds { index: 0, .. }
    ));
    assert!(matches!(
        warnings[1],
        ConfigWarning::IntensityClamped { used: 3, .. }
    ));

    let board = Board::initialize(&config, &mut BoardRng::new(2)).unwrap();
    assert_eq!(board.ice(Coord::new(2, 2)), 3);
}
