//! Placement tools.
//!
//! Each tool is a small state machine driven once per tick by the
//! [`ToolController`](crate::controller::ToolController), which guarantees
//! that at most one of them is active. Tools receive the shared
//! [`PlacementWorld`] and the host [`Scene`] as arguments and hold no
//! references of their own.

mod build;
mod destroy;
mod path;
mod relocate;

pub use build::BuildTool;
pub use destroy::DestroyTool;
pub use path::PathTool;
pub use relocate::{MoveState, MoveTool};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityKind};
use crate::input::TickInput;
use crate::placement::PlacementWorld;
use crate::preview::PlacementPreview;
use crate::scene::Scene;

/// Which tool holds the active slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolMode {
    /// Nothing active.
    #[default]
    None,
    /// Placing buildings.
    Build,
    /// Painting paths.
    Path,
    /// Removing entities.
    Destroy,
    /// Relocating entities.
    Move,
}

impl std::fmt::Display for ToolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ToolMode::None => "none",
            ToolMode::Build => "build",
            ToolMode::Path => "path",
            ToolMode::Destroy => "destroy",
            ToolMode::Move => "move",
        };
        f.write_str(name)
    }
}

/// What a tool asks of the controller after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSignal {
    /// Stay active.
    Continue,
    /// Give the active slot back (mode becomes [`ToolMode::None`]).
    Exit,
    /// Ask the owning tool to remove an entity, then stay active.
    Remove(EntityId),
}

/// Common surface of every tool.
pub trait Tool {
    /// Mode this tool occupies.
    fn mode(&self) -> ToolMode;

    /// Take the active slot. Returns `false` when the tool has nothing to
    /// do (e.g. no prefab selected), in which case it stays inactive.
    fn activate(
        &mut self,
        world: &mut PlacementWorld,
        scene: &mut dyn Scene,
        cursor: Option<Vec2>,
    ) -> bool;

    /// Give up the active slot, leaving no preview behind and the ledger
    /// exactly as committed. Safe to call on an inactive tool.
    fn deactivate(&mut self, world: &mut PlacementWorld, scene: &mut dyn Scene);

    /// Run one tick.
    fn tick(
        &mut self,
        world: &mut PlacementWorld,
        scene: &mut dyn Scene,
        input: &TickInput,
    ) -> ToolSignal;

    /// Preview currently under the cursor.
    fn preview(&self) -> Option<&PlacementPreview> {
        None
    }

    /// Kind of entity this tool creates and owns.
    fn owns(&self) -> Option<EntityKind> {
        None
    }

    /// Remove one of this tool's entities.
    ///
    /// Returns `false` when the id is unknown or owned by another tool.
    fn remove_by_id(
        &mut self,
        world: &mut PlacementWorld,
        scene: &mut dyn Scene,
        id: EntityId,
    ) -> bool {
        match self.owns() {
            Some(kind) if world.entities.registry(kind).contains(id) => world.remove(id, scene),
            _ => false,
        }
    }
}
