//! Player actions and the reports produced once they finish.

use crate::interaction::InteractionBranch;
use crate::movement::MotionOutcome;
use crate::types::{Direction, RelativeDirection, Vec3};
use serde::{Deserialize, Serialize};

/// How a move names its direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    /// Relative to the player's facing at the moment the move starts.
    Relative(RelativeDirection),
    /// Absolute world vector; must be one of the six unit axes.
    Vector(Vec3),
}

impl Heading {
    pub fn forward() -> Self {
        Heading::Relative(RelativeDirection::Forward)
    }

    /// Resolve against `facing`. `None` when the result is not axis-aligned.
    pub fn resolve(self, facing: Option<Direction>) -> Option<Direction> {
        match self {
            Heading::Relative(rel) => facing.map(|f| rel.resolve(f)),
            Heading::Vector(v) => Direction::from_vector(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Left,
    Right,
}

impl Turn {
    /// Yaw change in degrees.
    pub fn degrees(self) -> f32 {
        match self {
            Turn::Left => -90.0,
            Turn::Right => 90.0,
        }
    }
}

/// A queued player intent. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Action {
    Move {
        heading: Heading,
        distance: u32,
        speed: f32,
    },
    Rotate {
        turn: Turn,
    },
    Interact,
}

impl Action {
    pub fn forward(distance: u32, speed: f32) -> Self {
        Action::Move {
            heading: Heading::forward(),
            distance,
            speed,
        }
    }

    pub fn toward(direction: Direction, distance: u32, speed: f32) -> Self {
        Action::Move {
            heading: Heading::Vector(direction.unit()),
            distance,
            speed,
        }
    }

    pub fn turn(turn: Turn) -> Self {
        Action::Rotate { turn }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Move { .. } => "move",
            Action::Rotate { .. } => "rotate",
            Action::Interact => "interact",
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ActionOutcome {
    Moved { motion: MotionOutcome },
    Turned { yaw: f32 },
    Interacted { branch: InteractionBranch },
    /// The action could not run and was skipped.
    Rejected { reason: String },
    /// Cut short by a level restart or switch.
    Interrupted,
}

/// Emitted once per action when it reaches `Done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    /// Monotonic execution sequence number, starting at 1.
    pub seq: u64,
    pub action: Action,
    pub outcome: ActionOutcome,
}
