//! Building placement.
//!
//! Single shot: a valid left click places the building and hands the
//! active slot back, unless the repeat modifier is held, in which case a
//! fresh preview of the same type is spawned straight away.

use glam::Vec2;

use super::{Tool, ToolMode, ToolSignal};
use crate::catalog::PrefabKind;
use crate::entity::EntityKind;
use crate::events::PlacementEvent;
use crate::input::{ClickDetector, TickInput};
use crate::placement::{Placement, PlacementWorld};
use crate::preview::PlacementPreview;
use crate::rotation::RotationController;
use crate::scene::Scene;

/// Places blocking structures.
#[derive(Debug, Clone)]
pub struct BuildTool {
    selected: Option<usize>,
    preview: Option<PlacementPreview>,
    cancel_click: ClickDetector,
}

impl BuildTool {
    /// Create an idle build tool.
    #[must_use]
    pub fn new(world: &PlacementWorld) -> Self {
        Self {
            selected: None,
            preview: None,
            cancel_click: ClickDetector::new(
                world.config.click_max_duration_secs,
                world.config.click_max_drag_pixels,
            ),
        }
    }

    /// Choose what the next activation places.
    ///
    /// Returns `false` when `type_index` is not a building in the catalog.
    pub fn select(&mut self, world: &PlacementWorld, type_index: usize) -> bool {
        match world.catalog.get(type_index) {
            Some(prefab) if prefab.kind == PrefabKind::Building => {
                self.selected = Some(type_index);
                true
            }
            _ => false,
        }
    }

    /// Type placed by the next activation.
    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn spawn_preview(
        &mut self,
        world: &PlacementWorld,
        scene: &mut dyn Scene,
        cursor: Option<Vec2>,
    ) -> bool {
        let Some((type_index, prefab)) = self
            .selected
            .and_then(|index| world.catalog.get(index).map(|prefab| (index, prefab)))
        else {
            return false;
        };

        let rotation = RotationController::for_buildings(&world.config);
        self.preview = Some(PlacementPreview::spawn(
            world, scene, type_index, prefab, rotation, cursor,
        ));
        true
    }

    fn cancel_preview(&mut self, scene: &mut dyn Scene) {
        if let Some(preview) = self.preview.take() {
            preview.cancel(scene);
        }
    }
}

impl Tool for BuildTool {
    fn mode(&self) -> ToolMode {
        ToolMode::Build
    }

    fn activate(
        &mut self,
        world: &mut PlacementWorld,
        scene: &mut dyn Scene,
        cursor: Option<Vec2>,
    ) -> bool {
        self.cancel_click.reset();
        self.spawn_preview(world, scene, cursor)
    }

    fn deactivate(&mut self, world: &mut PlacementWorld, scene: &mut dyn Scene) {
        if let Some(preview) = self.preview.take() {
            world.events.push(PlacementEvent::PreviewCancelled {
                type_index: preview.type_index(),
            });
            preview.cancel(scene);
        }
        self.cancel_click.reset();
    }

    fn tick(
        &mut self,
        world: &mut PlacementWorld,
        scene: &mut dyn Scene,
        input: &TickInput,
    ) -> ToolSignal {
        let right_click = self
            .cancel_click
            .update(input.secondary, input.time, input.cursor);
        if input.cancel || right_click {
            tracing::debug!("Build placement cancelled");
            return ToolSignal::Exit;
        }

        let Some(preview) = self.preview.as_mut() else {
            return ToolSignal::Exit;
        };
        let Some(prefab) = world.catalog.get(preview.type_index()) else {
            self.cancel_preview(scene);
            return ToolSignal::Exit;
        };

        preview.update(world, scene, prefab, input);

        if !input.primary.just_pressed {
            return ToolSignal::Continue;
        }
        if !preview.is_valid() {
            tracing::debug!("Build confirm ignored: preview is invalid");
            return ToolSignal::Continue;
        }

        let request = Placement {
            id: None,
            type_index: preview.type_index(),
            position: preview.position(),
            angle: preview.angle(),
            instance: Some(preview.instance()),
            speed_modifier: None,
        };
        if world.confirm(request).is_none() {
            return ToolSignal::Continue;
        }

        if let Some(preview) = self.preview.take() {
            preview.finish(scene);
        }

        if input.modifier && self.spawn_preview(world, scene, input.cursor) {
            ToolSignal::Continue
        } else {
            ToolSignal::Exit
        }
    }

    fn preview(&self) -> Option<&PlacementPreview> {
        self.preview.as_ref()
    }

    fn owns(&self) -> Option<EntityKind> {
        Some(EntityKind::Structure)
    }
}
