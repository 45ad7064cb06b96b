//! Headless Gem Cascade runner (default binary).
//!
//! Loads a level (JSON file given as the first argument, or the built-in level),
//! autoplays it with the hint engine and prints the final board and a snapshot.
//!
//! Environment:
//!   GEM_CASCADE_SEED       override the level seed
//!   GEM_CASCADE_MAX_MOVES  stop after this many moves
//!   RUST_LOG               log filter (default `info`)

use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use gem_cascade::core::{GameSession, LevelConfig};
use gem_cascade::engine::run_to_end;
use gem_cascade::types::{Color, Coord, GoalKind, ObstacleKind};

const SEED_VAR: &str = "GEM_CASCADE_SEED";
const MAX_MOVES_VAR: &str = "GEM_CASCADE_MAX_MOVES";
const DEFAULT_LOG_FILTER: &str = "info";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => load_level(Path::new(&path))?,
        None => builtin_level(),
    };
    if let Some(seed) = env_number::<u64>(SEED_VAR)? {
        config.seed = Some(seed);
    }
    let max_moves = env_number::<u32>(MAX_MOVES_VAR)?.unwrap_or(config.move_limit);

    let mut session = GameSession::new(config).context("failed to set up level")?;
    tracing::info!(
        seed = session.seed(),
        width = session.board().width(),
        height = session.board().height(),
        "starting level"
    );

    let report = run_to_end(&mut session, max_moves).context("simulation aborted")?;
    tracing::info!(
        moves = report.moves_played,
        shuffles = report.shuffles,
        score = report.score,
        state = report.final_state.as_str(),
        "level finished"
    );

    print!("{}", session.board().to_ascii());
    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    Ok(())
}

/// `RUST_LOG` when it parses, otherwise `info`
fn log_filter(rust_log: Option<String>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn load_level(path: &Path) -> Result<LevelConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid level file {}", path.display()))
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a number, got {value:?}")),
        Err(_) => Ok(None),
    }
}

/// 8x8, five colors, a little of every obstacle
fn builtin_level() -> LevelConfig {
    LevelConfig::new(8, 8, Color::palette(5))
        .with_moves(25)
        .with_seed(2024)
        .with_goal(GoalKind::CollectColor, Some(Color(0)), 30)
        .with_goal(GoalKind::BreakIce, None, 4)
        .with_goal(GoalKind::BreakCrate, None, 2)
        .with_obstacle(Coord::new(2, 2), ObstacleKind::Ice, 2)
        .with_obstacle(Coord::new(5, 2), ObstacleKind::Ice, 2)
        .with_obstacle(Coord::new(2, 5), ObstacleKind::Ice, 1)
        .with_obstacle(Coord::new(5, 5), ObstacleKind::Ice, 1)
        .with_obstacle(Coord::new(0, 4), ObstacleKind::Crate, 2)
        .with_obstacle(Coord::new(7, 4), ObstacleKind::Crate, 1)
        .with_obstacle(Coord::new(3, 0), ObstacleKind::Stone, 1)
        .with_obstacle(Coord::new(4, 0), ObstacleKind::Stone, 1)
}
