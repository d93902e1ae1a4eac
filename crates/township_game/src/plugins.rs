//! Game plugins for Bevy.
//!
//! This module provides the plugin groups for the game client,
//! aggregating the construction plugins into a single registration point.

use bevy::app::PluginGroupBuilder;
use bevy::prelude::*;

use crate::camera::CameraPlugin;
use crate::construction::ConstructionPlugin;
use crate::data_loader::PlacementDataPlugin;
use crate::ui::GameUiPlugin;

// ============================================================================
// Plugin Groups
// ============================================================================

/// Main plugin group containing all game client plugins.
///
/// # Example
/// ```ignore
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(GamePlugins)
///     .run();
/// ```
pub struct GamePlugins;

impl PluginGroup for GamePlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(PlacementDataPlugin) // Load catalog and config first
            .add(CameraPlugin)
            .add(ConstructionPlugin)
            .add(GameUiPlugin)
    }
}

/// Headless plugin group for testing the construction systems.
///
/// Runs the placement tools and sprite sync without a window, camera or
/// egui. Uses the built-in catalog unless a [`crate::construction::Township`]
/// resource is inserted first.
///
/// # Example
/// ```ignore
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(HeadlessGamePlugins)
///     .run();
/// ```
pub struct HeadlessGamePlugins;

impl PluginGroup for HeadlessGamePlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>().add(ConstructionPlugin)
    }
}
