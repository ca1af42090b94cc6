//! Core lattice and math types shared across all modules.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

// ---------------------------------------------------------------------------
// Basic math
// ---------------------------------------------------------------------------

/// Continuous world-space position. Axes follow the hosting scene:
/// +x right, +y up, +z forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (other - self).length()
    }

    /// Linear blend; `t` is not clamped.
    pub fn lerp(self, to: Vec3, t: f32) -> Vec3 {
        self + (to - self) * t
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Lattice
// ---------------------------------------------------------------------------

/// One discrete lattice position. Equality is exact integer equality.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, Default)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell `steps` cells away along `direction`.
    pub fn step(self, direction: Direction, steps: i32) -> Self {
        let (dx, dy, dz) = direction.offset();
        Self::new(
            self.x + dx * steps,
            self.y + dy * steps,
            self.z + dz * steps,
        )
    }

    /// The face-neighbour along `direction`.
    pub fn neighbour(self, direction: Direction) -> Self {
        self.step(direction, 1)
    }

    pub fn below(self) -> Self {
        self.neighbour(Direction::Down)
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{},{}]", self.x, self.y, self.z)
    }
}

/// Distance between neighbouring cells in world units.
///
/// Horizontal spacing covers the block size plus the visible gap between
/// blocks; vertical spacing is the block height.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GridSpacing {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Default for GridSpacing {
    fn default() -> Self {
        Self {
            horizontal: 1.0 + 0.1,
            vertical: 1.0,
        }
    }
}

impl GridSpacing {
    /// Resolve a world position to its cell by rounding each axis.
    pub fn cell_of(&self, position: Vec3) -> CellCoord {
        CellCoord::new(
            (position.x / self.horizontal).round() as i32,
            (position.y / self.vertical).round() as i32,
            (position.z / self.horizontal).round() as i32,
        )
    }

    /// Centre of `cell` in world space.
    pub fn world_of(&self, cell: CellCoord) -> Vec3 {
        Vec3::new(
            cell.x as f32 * self.horizontal,
            cell.y as f32 * self.vertical,
            cell.z as f32 * self.horizontal,
        )
    }

    /// World-space displacement for `cells` cells along `direction`.
    pub fn offset(&self, direction: Direction, cells: i32) -> Vec3 {
        let spacing = if direction.is_vertical() {
            self.vertical
        } else {
            self.horizontal
        };
        direction.unit() * (cells as f32 * spacing)
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// One of the six axis unit vectors.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
    Forward,
    Back,
}

/// Tolerance used when snapping a free vector or yaw onto an axis.
const AXIS_EPSILON: f32 = 1e-3;

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
        Direction::Forward,
        Direction::Back,
    ];

    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Right => (1, 0, 0),
            Direction::Left => (-1, 0, 0),
            Direction::Up => (0, 1, 0),
            Direction::Down => (0, -1, 0),
            Direction::Forward => (0, 0, 1),
            Direction::Back => (0, 0, -1),
        }
    }

    pub fn unit(self) -> Vec3 {
        let (x, y, z) = self.offset();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Forward => Direction::Back,
            Direction::Back => Direction::Forward,
        }
    }

    /// Exact axis match for a free vector, or `None` when the vector is not
    /// one of the six unit axes.
    pub fn from_vector(v: Vec3) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| d.unit().distance(v) < AXIS_EPSILON)
    }

    /// Horizontal facing for a yaw in degrees (0 = +z, 90 = +x).
    ///
    /// Returns `None` while the yaw sits between quarter turns.
    pub fn from_yaw(yaw_degrees: f32) -> Option<Direction> {
        if !yaw_degrees.is_finite() {
            return None;
        }
        let quarters = yaw_degrees / 90.0;
        let snapped = quarters.round();
        if (quarters - snapped).abs() * 90.0 > AXIS_EPSILON {
            return None;
        }
        match (snapped as i64).rem_euclid(4) {
            0 => Some(Direction::Forward),
            1 => Some(Direction::Right),
            2 => Some(Direction::Back),
            _ => Some(Direction::Left),
        }
    }

    /// The horizontal direction a quarter turn clockwise (seen from above).
    /// Vertical directions are returned unchanged.
    pub fn turned_right(self) -> Direction {
        match self {
            Direction::Forward => Direction::Right,
            Direction::Right => Direction::Back,
            Direction::Back => Direction::Left,
            Direction::Left => Direction::Forward,
            vertical => vertical,
        }
    }

    pub fn turned_left(self) -> Direction {
        self.turned_right().opposite()
    }
}

/// A direction named relative to the player's current facing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeDirection {
    Forward,
    Back,
    Left,
    Right,
}

impl RelativeDirection {
    pub fn resolve(self, facing: Direction) -> Direction {
        match self {
            RelativeDirection::Forward => facing,
            RelativeDirection::Back => facing.opposite(),
            RelativeDirection::Left => facing.turned_left(),
            RelativeDirection::Right => facing.turned_right(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// Continuous transform of the player piece.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    /// Rotation about +y in degrees.
    pub yaw: f32,
}

impl Pose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStats {
    pub level_id: Option<u32>,
    pub frame: u64,
    pub pending_actions: usize,
    pub completed_actions: u64,
    pub paused: bool,
}
