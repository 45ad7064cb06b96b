//! Goal tracker - level objectives fed by cascade events
//!
//! Progress is monotonic and capped at the target. The win check ("all goals
//! complete") and the loss check belong to the session, which only runs them
//! once a cascade has settled.

use serde::Serialize;

use crate::level::GoalTemplate;
use crate::types::{Color, Coord, GoalKind, TileKind};

/// Facts the cascade resolver reports to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalEvent {
    /// A tile was actually removed (not merely shielded by ice)
    TileCleared {
        kind: TileKind,
        color: Option<Color>,
    },
    /// An ice overlay lost its last layer
    IceDestroyed { pos: Coord },
    CrateDestroyed { pos: Coord },
}

/// One objective and its progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub kind: GoalKind,
    pub target_color: Option<Color>,
    pub target: u32,
    pub current: u32,
}

impl Goal {
    pub fn from_template(template: &GoalTemplate) -> Self {
        Self {
            kind: template.kind,
            target_color: template.color,
            target: template.amount,
            current: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.target
    }

    /// Count `event` toward this goal. Returns true if progress changed.
    pub fn observe(&mut self, event: &GoalEvent) -> bool {
        if self.is_complete() {
            return false;
        }
        let counts = match (self.kind, event) {
            (GoalKind::CollectColor, GoalEvent::TileCleared { color, .. }) => {
                color.is_some() && *color == self.target_color
            }
            (GoalKind::BreakIce, GoalEvent::IceDestroyed { .. }) => true,
            (GoalKind::BreakCrate, GoalEvent::CrateDestroyed { .. }) => true,
            _ => false,
        };
        if counts {
            self.current += 1;
        }
        counts
    }

    /// Set a `ReachScore` goal from the cumulative score. Never regresses.
    pub fn observe_score(&mut self, score: u32) -> bool {
        if self.kind != GoalKind::ReachScore {
            return false;
        }
        let next = score.min(self.target).max(self.current);
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalTracker {
    goals: Vec<Goal>,
}

impl GoalTracker {
    pub fn from_templates(templates: &[GoalTemplate]) -> Self {
        Self {
            goals: templates.iter().map(Goal::from_template).collect(),
        }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Feed one event to every goal, returning the indices whose progress moved
    pub fn apply(&mut self, event: &GoalEvent) -> Vec<usize> {
        self.goals
            .iter_mut()
            .enumerate()
            .filter_map(|(index, goal)| goal.observe(event).then_some(index))
            .collect()
    }

    pub fn apply_score(&mut self, score: u32) -> Vec<usize> {
        self.goals
            .iter_mut()
            .enumerate()
            .filter_map(|(index, goal)| goal.observe_score(score).then_some(index))
            .collect()
    }

    /// True when every goal is met. A level without goals never completes.
    pub fn all_complete(&self) -> bool {
        !self.goals.is_empty() && self.goals.iter().all(Goal::is_complete)
    }

    pub fn reset(&mut self) {
        for goal in &mut self.goals {
            goal.current = 0;
        }
    }
}
