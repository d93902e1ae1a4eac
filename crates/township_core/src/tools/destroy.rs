//! Removing placed entities.
//!
//! The entity under the cursor is highlighted; clicking it asks the
//! controller to route a removal to the tool that owns it.

use glam::Vec2;

use super::{Tool, ToolMode, ToolSignal};
use crate::entity::EntityId;
use crate::input::{ClickDetector, TickInput};
use crate::placement::PlacementWorld;
use crate::scene::{InstanceId, Scene, Tint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Highlight {
    id: EntityId,
    instance: Option<InstanceId>,
}

/// Hover-highlight and delete.
#[derive(Debug, Clone)]
pub struct DestroyTool {
    highlight: Option<Highlight>,
    cancel_click: ClickDetector,
}

impl DestroyTool {
    /// Create an idle destroy tool.
    #[must_use]
    pub fn new(world: &PlacementWorld) -> Self {
        Self {
            highlight: None,
            cancel_click: ClickDetector::new(
                world.config.click_max_duration_secs,
                world.config.click_max_drag_pixels,
            ),
        }
    }

    /// Entity currently highlighted.
    #[must_use]
    pub fn highlighted(&self) -> Option<EntityId> {
        self.highlight.map(|highlight| highlight.id)
    }

    fn clear_highlight(&mut self, scene: &mut dyn Scene) {
        if let Some(Highlight {
            instance: Some(instance),
            ..
        }) = self.highlight.take()
        {
            scene.restore_appearance(instance);
        }
    }

    fn hover(&mut self, world: &PlacementWorld, scene: &mut dyn Scene, cursor: Option<Vec2>) {
        let target = cursor
            .and_then(|cursor| scene.pick_entity(cursor))
            .and_then(|id| world.entities.get(id))
            .map(|entity| Highlight {
                id: entity.id,
                instance: entity.instance,
            });

        if target == self.highlight {
            return;
        }

        self.clear_highlight(scene);
        if let Some(highlight) = target {
            if let Some(instance) = highlight.instance {
                scene.set_tint(instance, Tint::Highlight);
            }
            tracing::trace!("Highlighting entity {}", highlight.id);
        }
        self.highlight = target;
    }
}

impl Tool for DestroyTool {
    fn mode(&self) -> ToolMode {
        ToolMode::Destroy
    }

    fn activate(
        &mut self,
        world: &mut PlacementWorld,
        scene: &mut dyn Scene,
        cursor: Option<Vec2>,
    ) -> bool {
        self.cancel_click.reset();
        self.hover(world, scene, cursor);
        true
    }

    fn deactivate(&mut self, _world: &mut PlacementWorld, scene: &mut dyn Scene) {
        self.clear_highlight(scene);
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
            return ToolSignal::Exit;
        }

        self.hover(world, scene, input.cursor);

        if input.primary.just_pressed {
            if let Some(highlight) = self.highlight.take() {
                return ToolSignal::Remove(highlight.id);
            }
        }

        ToolSignal::Continue
    }
}
