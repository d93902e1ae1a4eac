//! Path painting.
//!
//! Holding the primary button paints tiles along the cursor, one per
//! placement interval; after every tile a fresh preview of the same type
//! takes over. A right-click tap drops the preview but keeps the tool, the
//! next primary press brings it back. Escape leaves the tool.

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

/// Paints non-blocking path tiles.
#[derive(Debug, Clone)]
pub struct PathTool {
    selected: Option<usize>,
    preview: Option<PlacementPreview>,
    cancel_click: ClickDetector,
    last_placed_at: Option<f64>,
}

impl PathTool {
    /// Create an idle path tool.
    #[must_use]
    pub fn new(world: &PlacementWorld) -> Self {
        Self {
            selected: None,
            preview: None,
            cancel_click: ClickDetector::new(
                world.config.click_max_duration_secs,
                world.config.click_max_drag_pixels,
            ),
            last_placed_at: None,
        }
    }

    /// Choose the path type to paint.
    ///
    /// Returns `false` when `type_index` is not a path in the catalog.
    pub fn select(&mut self, world: &PlacementWorld, type_index: usize) -> bool {
        match world.catalog.get(type_index) {
            Some(prefab) if prefab.kind == PrefabKind::Path => {
                self.selected = Some(type_index);
                true
            }
            _ => false,
        }
    }

    /// Type being painted.
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

        let rotation = RotationController::for_paths(&world.config);
        self.preview = Some(PlacementPreview::spawn(
            world, scene, type_index, prefab, rotation, cursor,
        ));
        true
    }

    fn drop_preview(&mut self, world: &mut PlacementWorld, scene: &mut dyn Scene) {
        if let Some(preview) = self.preview.take() {
            world.events.push(PlacementEvent::PreviewCancelled {
                type_index: preview.type_index(),
            });
            preview.cancel(scene);
        }
    }

    fn throttled(&self, now: f64, interval: f64) -> bool {
        self.last_placed_at.is_some_and(|last| now - last < interval)
    }
}

impl Tool for PathTool {
    fn mode(&self) -> ToolMode {
        ToolMode::Path
    }

    fn activate(
        &mut self,
        world: &mut PlacementWorld,
        scene: &mut dyn Scene,
        cursor: Option<Vec2>,
    ) -> bool {
        self.cancel_click.reset();
        self.last_placed_at = None;
        self.spawn_preview(world, scene, cursor)
    }

    fn deactivate(&mut self, world: &mut PlacementWorld, scene: &mut dyn Scene) {
        self.drop_preview(world, scene);
        self.cancel_click.reset();
    }

    fn tick(
        &mut self,
        world: &mut PlacementWorld,
        scene: &mut dyn Scene,
        input: &TickInput,
    ) -> ToolSignal {
        if input.cancel {
            tracing::debug!("Path painting ended");
            return ToolSignal::Exit;
        }

        if self
            .cancel_click
            .update(input.secondary, input.time, input.cursor)
        {
            self.drop_preview(world, scene);
            return ToolSignal::Continue;
        }

        if self.preview.is_none() {
            if input.primary.just_pressed && !self.spawn_preview(world, scene, input.cursor) {
                return ToolSignal::Exit;
            }
            return ToolSignal::Continue;
        }

        let throttled = self.throttled(input.time, world.config.path_placement_interval_secs);
        let Some(preview) = self.preview.as_mut() else {
            return ToolSignal::Continue;
        };
        let Some(prefab) = world.catalog.get(preview.type_index()) else {
            self.drop_preview(world, scene);
            return ToolSignal::Exit;
        };

        preview.update(world, scene, prefab, input);

        let painting = input.primary.pressed || input.primary.just_pressed;
        if !painting || throttled || !preview.is_valid() {
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
        self.last_placed_at = Some(input.time);

        if let Some(preview) = self.preview.take() {
            preview.finish(scene);
        }
        if !self.spawn_preview(world, scene, input.cursor) {
            return ToolSignal::Exit;
        }

        ToolSignal::Continue
    }

    fn preview(&self) -> Option<&PlacementPreview> {
        self.preview.as_ref()
    }

    fn owns(&self) -> Option<EntityKind> {
        Some(EntityKind::Path)
    }
}
