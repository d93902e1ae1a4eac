//! Occupancy ledger.
//!
//! The single authority over which cells are claimed and what movement
//! speed modifier each cell carries. Every tool reads it before deciding
//! validity; only the active tool writes to it.
//!
//! Occupancy is tracked per [`OccupancyLayer`]: buildings conflict with
//! buildings, paths conflict with paths, and the two never conflict with
//! each other. Speed modifiers live on a separate axis shared by both
//! layers: releasing a cell does not clear its modifier and setting a
//! modifier does not claim the cell.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::grid::Cell;

/// Which occupancy set a placement claims cells in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OccupancyLayer {
    /// Blocking placements (buildings).
    Structures,
    /// Non-blocking placements (paths).
    Paths,
}

/// Cell occupancy plus per-cell speed modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccupancyLedger {
    structures: BTreeSet<Cell>,
    paths: BTreeSet<Cell>,
    speed_modifiers: BTreeMap<Cell, f32>,
}

impl OccupancyLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn layer(&self, layer: OccupancyLayer) -> &BTreeSet<Cell> {
        match layer {
            OccupancyLayer::Structures => &self.structures,
            OccupancyLayer::Paths => &self.paths,
        }
    }

    fn layer_mut(&mut self, layer: OccupancyLayer) -> &mut BTreeSet<Cell> {
        match layer {
            OccupancyLayer::Structures => &mut self.structures,
            OccupancyLayer::Paths => &mut self.paths,
        }
    }

    /// True iff none of `cells` is occupied in `layer`.
    ///
    /// Stops at the first conflict.
    pub fn are_free(&self, layer: OccupancyLayer, cells: impl IntoIterator<Item = Cell>) -> bool {
        let occupied = self.layer(layer);
        cells.into_iter().all(|cell| !occupied.contains(&cell))
    }

    /// Whether a single cell is occupied in `layer`.
    #[must_use]
    pub fn is_occupied(&self, layer: OccupancyLayer, cell: Cell) -> bool {
        self.layer(layer).contains(&cell)
    }

    /// Claim `cells` in `layer`.
    ///
    /// Does not re-validate: callers check [`Self::are_free`] first. This
    /// keeps the vacate / validate / commit sequence of a move explicit.
    pub fn occupy(&mut self, layer: OccupancyLayer, cells: impl IntoIterator<Item = Cell>) {
        self.layer_mut(layer).extend(cells);
    }

    /// Release `cells` in `layer`. Cells already free are ignored.
    pub fn release(&mut self, layer: OccupancyLayer, cells: impl IntoIterator<Item = Cell>) {
        let occupied = self.layer_mut(layer);
        for cell in cells {
            occupied.remove(&cell);
        }
    }

    /// Overwrite the speed modifier of each cell.
    pub fn set_speed_modifier(&mut self, cells: impl IntoIterator<Item = Cell>, value: f32) {
        for cell in cells {
            self.speed_modifiers.insert(cell, value);
        }
    }

    /// Drop any speed modifier stored for `cells`.
    pub fn clear_speed_modifier(&mut self, cells: impl IntoIterator<Item = Cell>) {
        for cell in cells {
            self.speed_modifiers.remove(&cell);
        }
    }

    /// Speed modifier for a cell, `0.0` if none is stored.
    #[must_use]
    pub fn speed_modifier(&self, cell: Cell) -> f32 {
        self.speed_modifiers.get(&cell).copied().unwrap_or(0.0)
    }

    /// Raw stored modifier, distinguishing "absent" from an explicit value.
    #[must_use]
    pub fn stored_speed_modifier(&self, cell: Cell) -> Option<f32> {
        self.speed_modifiers.get(&cell).copied()
    }

    /// Restore a raw stored modifier captured with [`Self::stored_speed_modifier`].
    pub fn restore_speed_modifier(&mut self, cell: Cell, stored: Option<f32>) {
        match stored {
            Some(value) => {
                self.speed_modifiers.insert(cell, value);
            }
            None => {
                self.speed_modifiers.remove(&cell);
            }
        }
    }

    /// Occupied cells of a layer in ascending order.
    pub fn occupied(&self, layer: OccupancyLayer) -> impl Iterator<Item = Cell> + '_ {
        self.layer(layer).iter().copied()
    }

    /// Number of occupied cells in a layer.
    #[must_use]
    pub fn occupied_count(&self, layer: OccupancyLayer) -> usize {
        self.layer(layer).len()
    }

    /// Remove every occupancy and modifier.
    pub fn clear(&mut self) {
        self.structures.clear();
        self.paths.clear();
        self.speed_modifiers.clear();
    }
}
