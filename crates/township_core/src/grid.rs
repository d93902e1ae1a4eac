//! Grid coordinate system.
//!
//! The placement grid is implicit and unbounded: a cell is nothing more than
//! an integer `(x, z)` pair derived on demand from world positions. This
//! module converts between the two and turns world-space bounds into the set
//! of cells they cover.

use std::collections::BTreeSet;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::PlacementConfig;

// ============================================================================
// Cell
// ============================================================================

/// One square of the placement grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Cell {
    /// Column along the world X axis.
    pub x: i32,
    /// Row along the world Z axis.
    pub z: i32,
}

impl Cell {
    /// Create a new cell.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, z): (i32, i32)) -> Self {
        Self { x, z }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

// ============================================================================
// Footprint
// ============================================================================

/// The set of cells an object covers.
///
/// Stored sorted so iteration (and therefore logging, saving and hashing)
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    cells: BTreeSet<Cell>,
}

impl Footprint {
    /// An empty footprint.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of cells covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the footprint covers no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `cell` is covered.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Whether any cell is covered by both footprints.
    #[must_use]
    pub fn intersects(&self, other: &Footprint) -> bool {
        !self.cells.is_disjoint(&other.cells)
    }

    /// Iterate covered cells in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Covered cells as a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Cell> {
        self.iter().collect()
    }
}

impl FromIterator<Cell> for Footprint {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Footprint {
    type Item = Cell;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, Cell>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter().copied()
    }
}

// ============================================================================
// Bounds
// ============================================================================

/// Axis-aligned world-space box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    /// Create bounds from two corners (normalised so `min <= max`).
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box enclosing all `points`. Returns `None` for no points.
    #[must_use]
    pub fn enclosing(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    /// Bounds of a planar rectangle authored in local space, after rotating
    /// it by `rotation` about the pivot and moving the pivot to `position`.
    ///
    /// `local_min`/`local_max` are `(x, z)` offsets from the pivot.
    #[must_use]
    pub fn of_rotated_rect(local_min: Vec2, local_max: Vec2, position: Vec3, rotation: Quat) -> Self {
        let corners = [
            Vec3::new(local_min.x, 0.0, local_min.y),
            Vec3::new(local_max.x, 0.0, local_min.y),
            Vec3::new(local_min.x, 0.0, local_max.y),
            Vec3::new(local_max.x, 0.0, local_max.y),
        ];
        let world = corners.into_iter().map(|c| position + rotation * c);
        // Four corners are always present.
        Self::enclosing(world).unwrap_or(Self::new(position, position))
    }

    /// Extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

// ============================================================================
// Grid Coordinate System
// ============================================================================

/// Converts between world space and grid cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCoordinateSystem {
    cell_size: f32,
    origin: Vec3,
    epsilon: f32,
}

impl Default for GridCoordinateSystem {
    fn default() -> Self {
        Self::from_config(&PlacementConfig::default())
    }
}

impl GridCoordinateSystem {
    /// Create a grid.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not positive.
    #[must_use]
    pub fn new(cell_size: f32, origin: Vec3, epsilon: f32) -> Self {
        assert!(cell_size > 0.0, "GridCoordinateSystem cell_size must be positive");
        Self {
            cell_size,
            origin,
            epsilon,
        }
    }

    /// Build the grid described by a placement config.
    #[must_use]
    pub fn from_config(config: &PlacementConfig) -> Self {
        Self::new(config.cell_size, config.grid_origin, config.footprint_epsilon)
    }

    /// Cell size in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Grid origin.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Round the planar axes of `pos` to the nearest grid line.
    ///
    /// The vertical axis is returned unchanged.
    #[must_use]
    pub fn snap_to_grid(&self, pos: Vec3) -> Vec3 {
        let snap = |value: f32, origin: f32| {
            ((value - origin) / self.cell_size).round() * self.cell_size + origin
        };
        Vec3::new(snap(pos.x, self.origin.x), pos.y, snap(pos.z, self.origin.z))
    }

    /// The cell containing a world position.
    #[must_use]
    pub fn cell_of(&self, pos: Vec3) -> Cell {
        Cell::new(
            self.floor_axis(pos.x - self.epsilon, self.origin.x),
            self.floor_axis(pos.z - self.epsilon, self.origin.z),
        )
    }

    /// World position of a cell's minimum corner (at origin height).
    #[must_use]
    pub fn cell_corner(&self, cell: Cell) -> Vec3 {
        Vec3::new(
            self.origin.x + cell.x as f32 * self.cell_size,
            self.origin.y,
            self.origin.z + cell.z as f32 * self.cell_size,
        )
    }

    /// World position of a cell's centre (at origin height).
    #[must_use]
    pub fn cell_center(&self, cell: Cell) -> Vec3 {
        let half = self.cell_size / 2.0;
        self.cell_corner(cell) + Vec3::new(half, 0.0, half)
    }

    /// Every cell covered by `bounds`.
    ///
    /// The bounds are shrunk by the grid epsilon on each planar face first,
    /// so a box that ends exactly on a grid line does not spill into the
    /// neighbouring cell. A box thinner than twice the epsilon on either axis
    /// covers no cells.
    #[must_use]
    pub fn footprint_of(&self, bounds: &Bounds) -> Footprint {
        if !bounds.min.is_finite() || !bounds.max.is_finite() {
            return Footprint::empty();
        }

        let min_x = self.floor_axis(bounds.min.x + self.epsilon, self.origin.x);
        let max_x = self.floor_axis(bounds.max.x - self.epsilon, self.origin.x);
        let min_z = self.floor_axis(bounds.min.z + self.epsilon, self.origin.z);
        let max_z = self.floor_axis(bounds.max.z - self.epsilon, self.origin.z);

        if bounds.max.x - bounds.min.x <= 2.0 * self.epsilon
            || bounds.max.z - bounds.min.z <= 2.0 * self.epsilon
        {
            return Footprint::empty();
        }

        (min_x..=max_x)
            .flat_map(|x| (min_z..=max_z).map(move |z| Cell::new(x, z)))
            .collect()
    }

    #[inline]
    fn floor_axis(&self, value: f32, origin: f32) -> i32 {
        ((value - origin) / self.cell_size).floor() as i32
    }
}

// ============================================================================
// Tests
// ============================================================================
