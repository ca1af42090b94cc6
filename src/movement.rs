//! Movement simulator: resolves a whole move against the grid before any
//! animation starts.

use crate::config::{InteractableRole, RulePolicy, SpecialStop};
use crate::grid::{BlockKind, GridRegistry};
use crate::types::{CellCoord, Direction};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionReason {
    Completed,
    BlockedByObstacle,
    NoSupportBelow,
    ReachedSpecialCell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionOutcome {
    pub reached_cell: CellCoord,
    pub reason: MotionReason,
    /// Cells actually travelled from the start.
    pub travelled: u32,
}

impl MotionOutcome {
    pub fn is_completed(&self) -> bool {
        self.reason == MotionReason::Completed
    }
}

/// How the path treats an occupied candidate cell.
enum Occupancy {
    Free,
    Obstacle,
    Special,
}

fn occupancy(kind: Option<BlockKind>, rules: &RulePolicy) -> Occupancy {
    match kind {
        None => Occupancy::Free,
        Some(BlockKind::Static) => Occupancy::Obstacle,
        Some(BlockKind::Interactable) => match rules.interactable_role {
            InteractableRole::Obstacle => Occupancy::Obstacle,
            InteractableRole::Activator | InteractableRole::Goal => Occupancy::Special,
        },
        Some(BlockKind::Finish) => Occupancy::Special,
    }
}

/// Walk from `start` one cell at a time along `direction`, up to `distance`
/// cells.
///
/// Each candidate cell needs a block directly beneath it and must itself be
/// free. The first violation ends the walk on the last safe cell (or on the
/// special cell itself under [`SpecialStop::At`]).
pub fn simulate_move(
    grid: &GridRegistry,
    start: CellCoord,
    direction: Direction,
    distance: u32,
    rules: &RulePolicy,
) -> MotionOutcome {
    let stop = |travelled: u32, reason: MotionReason| MotionOutcome {
        reached_cell: start.step(direction, travelled as i32),
        reason,
        travelled,
    };

    for i in 1..=distance {
        let candidate = start.step(direction, i as i32);

        if grid.find_block_at(candidate.below()).is_none() {
            debug!("No support below {} (step {})", candidate, i);
            return stop(i - 1, MotionReason::NoSupportBelow);
        }

        match occupancy(grid.kind_at(candidate), rules) {
            Occupancy::Free => {}
            Occupancy::Obstacle => {
                debug!("Obstacle at {} (step {})", candidate, i);
                return stop(i - 1, MotionReason::BlockedByObstacle);
            }
            Occupancy::Special => {
                debug!("Special cell at {} (step {})", candidate, i);
                let travelled = match rules.special_stop {
                    SpecialStop::Before => i - 1,
                    SpecialStop::At => i,
                };
                return stop(travelled, MotionReason::ReachedSpecialCell);
            }
        }
    }

    stop(distance, MotionReason::Completed)
}
