//! # Township Core
//!
//! Grid construction core for the Township city builder.
//!
//! This crate owns everything about *where* things may be built:
//! - No rendering (visuals go through [`scene::VisualDelegate`])
//! - No camera math (cursor projection goes through [`scene::GroundProjector`])
//! - No economy (affordability is checked by the host before it forwards input)
//!
//! Every tool runs synchronously inside [`controller::ToolController::tick`],
//! one call per simulation frame. The [`ledger::OccupancyLedger`] is the only
//! state shared between tools and only the active tool writes to it.
//!
//! ## Crate Structure
//!
//! - [`grid`] - World/cell snapping and footprint computation
//! - [`ledger`] - Cell occupancy and speed modifiers
//! - [`rotation`] - Tap/hold rotation state machine
//! - [`preview`] - Ghost instance tracking the cursor
//! - [`tools`] - Build, path, move and destroy tools
//! - [`controller`] - Tool exclusivity and the public placement surface
//! - [`save`] - Persisted placement records

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod catalog;
pub mod config;
pub mod controller;
pub mod entity;
pub mod error;
pub mod events;
pub mod grid;
pub mod input;
pub mod ledger;
pub mod placement;
pub mod preview;
pub mod rotation;
pub mod save;
pub mod scene;
pub mod tools;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{Catalog, PrefabDef, PrefabKind};
    pub use crate::config::PlacementConfig;
    pub use crate::controller::ToolController;
    pub use crate::entity::{EntityId, EntityKind, PlacedEntity};
    pub use crate::error::{PlacementError, Result};
    pub use crate::events::PlacementEvent;
    pub use crate::grid::{Bounds, Cell, Footprint, GridCoordinateSystem};
    pub use crate::input::{ButtonState, TickInput};
    pub use crate::ledger::{OccupancyLayer, OccupancyLedger};
    pub use crate::save::SaveGame;
    pub use crate::scene::{
        EntityPicker, GroundProjector, HeadlessScene, InstanceId, Scene, Tint, VisualDelegate,
    };
    pub use crate::tools::ToolMode;
}
