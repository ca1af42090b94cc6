//! Level definitions, the built-in catalog, and construction of a playable
//! level (grid + spawn) from a definition.

use crate::config::RulePolicy;
use crate::grid::{Block, BlockKind, GridRegistry};
use crate::types::{CellCoord, GridSpacing, Pose, Vec3};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("unknown level {0}")]
    Unknown(u32),
    #[error("level {level}: block {index} and block {other} both resolve to cell {cell}")]
    OverlappingBlocks {
        level: u32,
        cell: CellCoord,
        index: usize,
        other: usize,
    },
    #[error("level {level}: block {index} needs exactly one of `position` or `cell`")]
    BlockPlacement { level: u32, index: usize },
    #[error("level {level}: spawn needs exactly one of `position` or `cell`")]
    SpawnPlacement { level: u32 },
    #[error("duplicate level id {0}")]
    DuplicateId(u32),
    #[error("level catalog is empty")]
    Empty,
    #[error("failed to parse level catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read level catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Definitions (serde)
// ---------------------------------------------------------------------------

/// Where something sits: a world position (rounded onto the lattice) or an
/// explicit cell. Exactly one must be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<CellCoord>,
}

impl Placement {
    pub fn at_cell(cell: CellCoord) -> Self {
        Self {
            position: None,
            cell: Some(cell),
        }
    }

    pub fn at_position(position: Vec3) -> Self {
        Self {
            position: Some(position),
            cell: None,
        }
    }

    /// World position and cell, or `None` when both or neither are set.
    fn resolve(&self, spacing: &GridSpacing) -> Option<(Vec3, CellCoord)> {
        match (self.position, self.cell) {
            (Some(p), None) => Some((p, spacing.cell_of(p))),
            (None, Some(c)) => Some((spacing.world_of(c), c)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub kind: BlockKind,
    #[serde(flatten)]
    pub at: Placement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSpec {
    #[serde(flatten)]
    pub at: Placement,
    /// Initial yaw in degrees (0 faces +z).
    #[serde(default)]
    pub yaw: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub blocks: Vec<BlockSpec>,
    pub spawn: SpawnSpec,
    /// Overrides the game-wide rules for this level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<RulePolicy>,
}

impl LevelDef {
    /// Hex md5 of the canonical JSON form; lets a host confirm which layout
    /// is loaded.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        format!("{:x}", md5::compute(bytes))
    }
}

// ---------------------------------------------------------------------------
// Built level
// ---------------------------------------------------------------------------

/// A level ready to play: the block grid plus where the player starts.
#[derive(Debug, Clone)]
pub struct Level {
    pub id: u32,
    pub name: String,
    pub grid: GridRegistry,
    pub spawn: Pose,
    pub rules: RulePolicy,
    pub fingerprint: String,
}

impl Level {
    pub fn build(
        def: &LevelDef,
        spacing: &GridSpacing,
        default_rules: RulePolicy,
    ) -> Result<Self, LevelError> {
        let mut grid = GridRegistry::new();
        let mut owners: HashMap<CellCoord, usize> = HashMap::new();

        for (index, block_spec) in def.blocks.iter().enumerate() {
            let (position, cell) = block_spec.at.resolve(spacing).ok_or(LevelError::BlockPlacement {
                level: def.id,
                index,
            })?;

            if grid.insert(Block::new(cell, block_spec.kind, position)).is_err() {
                return Err(LevelError::OverlappingBlocks {
                    level: def.id,
                    cell,
                    index,
                    other: owners.get(&cell).copied().unwrap_or_default(),
                });
            }
            owners.insert(cell, index);
        }

        let (spawn_position, _) = def
            .spawn
            .at
            .resolve(spacing)
            .ok_or(LevelError::SpawnPlacement { level: def.id })?;

        Ok(Self {
            id: def.id,
            name: def.name.clone(),
            grid,
            spawn: Pose::new(spawn_position, def.spawn.yaw),
            rules: def.rules.unwrap_or(default_rules),
            fingerprint: def.fingerprint(),
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: BTreeMap<u32, LevelDef>,
}

impl LevelCatalog {
    pub fn from_defs(defs: Vec<LevelDef>) -> Result<Self, LevelError> {
        if defs.is_empty() {
            return Err(LevelError::Empty);
        }
        let mut levels = BTreeMap::new();
        for def in defs {
            let id = def.id;
            if levels.insert(id, def).is_some() {
                return Err(LevelError::DuplicateId(id));
            }
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of level definitions.
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        let defs: Vec<LevelDef> = serde_json::from_str(json)?;
        Self::from_defs(defs)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        info!("Loaded {} level(s) from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn get(&self, id: u32) -> Result<&LevelDef, LevelError> {
        self.levels.get(&id).ok_or(LevelError::Unknown(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels shipped with the game.
    pub fn builtin() -> Self {
        let levels = [first_steps(), corner(), switchback()]
            .into_iter()
            .map(|def| (def.id, def))
            .collect();
        Self { levels }
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Built-in levels
// ---------------------------------------------------------------------------

fn block(kind: BlockKind, x: i32, y: i32, z: i32) -> BlockSpec {
    BlockSpec {
        kind,
        at: Placement::at_cell(CellCoord::new(x, y, z)),
    }
}

fn floor(cells: impl IntoIterator<Item = (i32, i32)>) -> Vec<BlockSpec> {
    cells
        .into_iter()
        .map(|(x, z)| block(BlockKind::Static, x, -1, z))
        .collect()
}

fn spawn_at(x: i32, z: i32, yaw: f32) -> SpawnSpec {
    SpawnSpec {
        at: Placement::at_cell(CellCoord::new(x, 0, z)),
        yaw,
    }
}

/// Straight walkway ending in the finish.
fn first_steps() -> LevelDef {
    let mut blocks = floor((0..=4).map(|z| (0, z)));
    blocks.push(block(BlockKind::Finish, 0, 0, 4));
    LevelDef {
        id: 1,
        name: "First steps".into(),
        blocks,
        spawn: spawn_at(0, 0, 0.0),
        rules: None,
    }
}

/// One right turn, with a wall at the end of the first leg.
fn corner() -> LevelDef {
    let mut blocks = floor((0..=4).map(|z| (0, z)).chain((1..=3).map(|x| (x, 3))));
    blocks.push(block(BlockKind::Static, 0, 0, 4));
    blocks.push(block(BlockKind::Finish, 3, 0, 3));
    LevelDef {
        id: 2,
        name: "Corner".into(),
        blocks,
        spawn: spawn_at(0, 0, 0.0),
        rules: None,
    }
}

/// A switch beside the path that has to be flipped on the way.
fn switchback() -> LevelDef {
    let mut blocks = floor((0..=5).map(|z| (0, z)).chain([(1, 2)]));
    blocks.push(block(BlockKind::Interactable, 1, 0, 2));
    blocks.push(block(BlockKind::Static, -1, 0, 3));
    blocks.push(block(BlockKind::Finish, 0, 0, 5));
    LevelDef {
        id: 3,
        name: "Switchback".into(),
        blocks,
        spawn: spawn_at(0, 0, 0.0),
        rules: Some(RulePolicy {
            persist_activation: true,
            ..RulePolicy::default()
        }),
    }
}
