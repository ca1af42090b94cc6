//! Grid registry: exact cell → block index for the active level, plus the
//! mutable side table of activated blocks.

use crate::types::{CellCoord, Direction, Vec3};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Static,
    Interactable,
    Finish,
}

/// A single block placed in a level. Never moves after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub cell: CellCoord,
    pub kind: BlockKind,
    /// World-space origin the block was authored at.
    pub position: Vec3,
}

impl Block {
    pub fn new(cell: CellCoord, kind: BlockKind, position: Vec3) -> Self {
        Self {
            cell,
            kind,
            position,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Read-only index from cell coordinate to the block occupying it.
#[derive(Debug, Clone, Default)]
pub struct GridRegistry {
    blocks: HashMap<CellCoord, Block>,
}

impl GridRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `block` by its cell.
    ///
    /// On collision the existing occupant is kept and the rejected block is
    /// handed back.
    pub fn insert(&mut self, block: Block) -> Result<(), Block> {
        match self.blocks.entry(block.cell) {
            Entry::Occupied(_) => Err(block),
            Entry::Vacant(v) => {
                v.insert(block);
                Ok(())
            }
        }
    }

    pub fn find_block_at(&self, cell: CellCoord) -> Option<&Block> {
        self.blocks.get(&cell)
    }

    pub fn kind_at(&self, cell: CellCoord) -> Option<BlockKind> {
        self.find_block_at(cell).map(|b| b.kind)
    }

    /// Occupants of the six face-neighbours of `cell`.
    pub fn adjacent_blocks(&self, cell: CellCoord) -> Vec<&Block> {
        Direction::ALL
            .iter()
            .filter_map(|d| self.find_block_at(cell.neighbour(*d)))
            .collect()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn count_of(&self, kind: BlockKind) -> usize {
        self.blocks.values().filter(|b| b.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl FromIterator<Block> for GridRegistry {
    /// Later duplicates are dropped with a warning; use
    /// [`GridRegistry::insert`] to handle them.
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        let mut grid = GridRegistry::new();
        for block in iter {
            if let Err(dropped) = grid.insert(block) {
                warn!("Dropping {:?} block at occupied cell {}", dropped.kind, dropped.cell);
            }
        }
        grid
    }
}

// ---------------------------------------------------------------------------
// Block states
// ---------------------------------------------------------------------------

/// Activated interactable cells. Only written when the level's rules persist
/// activation; the registry itself is never mutated during play.
#[derive(Debug, Clone, Default)]
pub struct BlockStates {
    activated: HashSet<CellCoord>,
}

impl BlockStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the activation of `cell`, returning the new state.
    pub fn toggle(&mut self, cell: CellCoord) -> bool {
        if self.activated.remove(&cell) {
            false
        } else {
            self.activated.insert(cell);
            true
        }
    }

    pub fn is_activated(&self, cell: CellCoord) -> bool {
        self.activated.contains(&cell)
    }

    pub fn activated_count(&self) -> usize {
        self.activated.len()
    }

    pub fn clear(&mut self) {
        self.activated.clear();
    }
}
