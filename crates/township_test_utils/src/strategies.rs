//! Proptest strategies for placement testing.
//!
//! These generate random but reproducible placement sessions for
//! property-based testing of the occupancy invariant.

use proptest::prelude::*;
use township_core::grid::Cell;

use crate::fixtures::{HALL, HUT, ROAD, SHED, TRAIL};

/// One step of a random placement session.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementAction {
    /// Place catalog entry `type_index` at cell `(x, z)` after `taps`
    /// rotate taps.
    Place {
        /// Catalog index.
        type_index: usize,
        /// Target cell.
        cell: Cell,
        /// Rotate taps before confirming.
        taps: u8,
    },
    /// Remove the `nth` placed entity (modulo the entity count).
    Remove {
        /// Index into the current entity list.
        nth: usize,
    },
    /// Move the `nth` placed entity to `cell`, committing or cancelling.
    Move {
        /// Index into the current entity list.
        nth: usize,
        /// Destination cell.
        cell: Cell,
        /// Cancel instead of committing.
        cancel: bool,
    },
}

/// Cells in a small arena so collisions are frequent.
pub fn arb_cell() -> impl Strategy<Value = Cell> {
    (-6i32..6i32, -6i32..6i32).prop_map(|(x, z)| Cell::new(x, z))
}

/// Any fixture catalog entry.
pub fn arb_type_index() -> impl Strategy<Value = usize> {
    prop_oneof![Just(HUT), Just(SHED), Just(HALL), Just(TRAIL), Just(ROAD)]
}

/// A single session step.
pub fn arb_action() -> impl Strategy<Value = PlacementAction> {
    prop_oneof![
        3 => (arb_type_index(), arb_cell(), 0u8..4u8)
            .prop_map(|(type_index, cell, taps)| PlacementAction::Place { type_index, cell, taps }),
        1 => (0usize..16).prop_map(|nth| PlacementAction::Remove { nth }),
        2 => (0usize..16, arb_cell(), any::<bool>())
            .prop_map(|(nth, cell, cancel)| PlacementAction::Move { nth, cell, cancel }),
    ]
}

/// A session of up to `max_len` steps.
pub fn arb_session(max_len: usize) -> impl Strategy<Value = Vec<PlacementAction>> {
    proptest::collection::vec(arb_action(), 1..max_len)
}

/// A set of cells for ledger properties.
pub fn arb_cells(max_len: usize) -> impl Strategy<Value = Vec<Cell>> {
    proptest::collection::vec(arb_cell(), 0..max_len)
}
