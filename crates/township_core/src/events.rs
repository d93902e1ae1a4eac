//! Placement events.
//!
//! Tools record what they committed; the host drains the log once per
//! frame (audio, UI, economy bookkeeping live outside the core).

use crate::entity::{EntityId, EntityKind};
use crate::grid::Cell;
use crate::tools::ToolMode;

/// Something observable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementEvent {
    /// A preview was confirmed into a new entity.
    Placed {
        /// New entity.
        id: EntityId,
        /// Catalog index.
        type_index: usize,
        /// Owning tool.
        kind: EntityKind,
    },
    /// A move was committed.
    Moved {
        /// Moved entity.
        id: EntityId,
        /// Cells it covered before.
        from: Vec<Cell>,
        /// Cells it covers now.
        to: Vec<Cell>,
    },
    /// A move was abandoned and rolled back.
    MoveRolledBack {
        /// Entity restored in place.
        id: EntityId,
    },
    /// An entity was removed.
    Removed {
        /// Removed entity.
        id: EntityId,
        /// Former owner.
        kind: EntityKind,
    },
    /// A preview was discarded without placing anything.
    PreviewCancelled {
        /// Catalog index of the discarded preview.
        type_index: usize,
    },
    /// The active tool changed.
    ToolChanged {
        /// Previous mode.
        from: ToolMode,
        /// New mode.
        to: ToolMode,
    },
}
