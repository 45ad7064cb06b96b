//! Headless driver: plays a session with the hint engine, acknowledging every
//! phase immediately

use gem_cascade_core::{GameSession, MoveOutcome, Result, TileRng};
use gem_cascade_types::SessionState;

use crate::hint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayReport {
    pub moves_played: u32,
    pub shuffles: u32,
    pub score: u32,
    pub final_state: SessionState,
}

/// Play until the level ends, no hint exists, or `max_moves` moves were made
pub fn run_to_end<R: TileRng>(session: &mut GameSession<R>, max_moves: u32) -> Result<PlayReport> {
    session.start()?;
    session.acknowledge_all();

    let mut moves_played = 0;
    let mut shuffles = 0;
    while moves_played < max_moves && session.state().accepts_input() {
        let Some(hint) = hint::suggest_move(session.board()) else {
            tracing::warn!("no move to suggest on a waiting board");
            break;
        };

        match session.request_move(hint.from, hint.to)? {
            MoveOutcome::Accepted(summary) => {
                moves_played += 1;
                if summary.shuffled {
                    shuffles += 1;
                }
                tracing::info!(
                    from = %hint.from,
                    to = %hint.to,
                    cleared = summary.cleared,
                    score = session.score(),
                    moves_left = session.moves_left(),
                    "move {}",
                    moves_played
                );
            }
            other => {
                tracing::warn!(?other, "suggested move was not accepted");
                session.acknowledge_all();
                break;
            }
        }
        session.acknowledge_all();
    }

    Ok(PlayReport {
        moves_played,
        shuffles,
        score: session.score(),
        final_state: session.state(),
    })
}
