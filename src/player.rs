//! The player piece: continuous pose plus the cell it resolves to.

use crate::types::{CellCoord, Direction, GridSpacing, Pose};

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pose: Pose,
    cell: CellCoord,
}

impl Player {
    pub fn spawn(pose: Pose, spacing: &GridSpacing) -> Self {
        Self {
            pose,
            cell: spacing.cell_of(pose.position),
        }
    }

    /// Cell as of the last completed motion.
    pub fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Re-derive the cell from the current position.
    pub fn sync_cell(&mut self, spacing: &GridSpacing) -> CellCoord {
        self.cell = spacing.cell_of(self.pose.position);
        self.cell
    }

    /// Facing derived from the current yaw; `None` mid-turn.
    pub fn facing(&self) -> Option<Direction> {
        Direction::from_yaw(self.pose.yaw)
    }
}
