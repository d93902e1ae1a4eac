//! Moving placed entities.
//!
//! Picking an entity vacates its cells and turns its own instance into the
//! preview, so it never blocks its own destination. A valid click commits
//! the new pose; a cancel (right-click tap, Escape, or losing the active
//! slot) puts everything back exactly as it was.

use std::collections::BTreeMap;

use glam::Vec2;

use super::{Tool, ToolMode, ToolSignal};
use crate::catalog::PrefabKind;
use crate::entity::{EntityId, PlacedEntity};
use crate::events::PlacementEvent;
use crate::grid::Cell;
use crate::input::{ClickDetector, TickInput};
use crate::placement::PlacementWorld;
use crate::preview::PlacementPreview;
use crate::rotation::RotationController;
use crate::scene::Scene;

/// Where the move tool is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    /// Inactive.
    Idle,
    /// Waiting for a click on a placed entity.
    Selecting,
    /// Carrying an entity whose cells have been vacated.
    Dragging,
}

/// Everything needed to undo a pick.
#[derive(Debug, Clone)]
struct Carried {
    original: PlacedEntity,
    modifiers: BTreeMap<Cell, Option<f32>>,
    preview: PlacementPreview,
}

/// Relocates buildings and paths.
#[derive(Debug, Clone)]
pub struct MoveTool {
    state: MoveState,
    carried: Option<Carried>,
    cancel_click: ClickDetector,
}

impl MoveTool {
    /// Create an idle move tool.
    #[must_use]
    pub fn new(world: &PlacementWorld) -> Self {
        Self {
            state: MoveState::Idle,
            carried: None,
            cancel_click: ClickDetector::new(
                world.config.click_max_duration_secs,
                world.config.click_max_drag_pixels,
            ),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> MoveState {
        self.state
    }

    /// The entity being carried, as it was before it was picked up.
    #[must_use]
    pub fn carried(&self) -> Option<&PlacedEntity> {
        self.carried.as_ref().map(|carried| &carried.original)
    }

    /// Pick `id` up: unregister it, vacate its cells and adopt its
    /// instance as the preview. Returns `false` for an unknown id.
    pub fn pick(&mut self, world: &mut PlacementWorld, scene: &mut dyn Scene, id: EntityId) -> bool {
        let Some(kind) = world.entities.kind_of(id) else {
            return false;
        };
        let Some(entity) = world.entities.registry_mut(kind).remove(id) else {
            return false;
        };
        let Some(prefab) = world.catalog.get(entity.type_index).cloned() else {
            world.entities.registry_mut(kind).insert(entity);
            return false;
        };

        let modifiers = world.vacate(&entity);

        let rotation = match prefab.kind {
            PrefabKind::Building => RotationController::for_buildings(&world.config),
            PrefabKind::Path => RotationController::for_paths(&world.config),
        }
        .with_angle(entity.angle);

        let preview = PlacementPreview::adopt(
            world,
            scene,
            entity.type_index,
            &prefab,
            entity.instance,
            entity.position,
            rotation,
        );

        tracing::debug!("Picked up entity {} from {} cells", id, entity.footprint.len());

        self.carried = Some(Carried {
            original: entity,
            modifiers,
            preview,
        });
        self.state = MoveState::Dragging;
        true
    }

    /// Put the carried entity back exactly where it was.
    pub fn rollback(&mut self, world: &mut PlacementWorld, scene: &mut dyn Scene) {
        let Some(Carried {
            original,
            modifiers,
            preview,
        }) = self.carried.take()
        else {
            return;
        };

        let pose = preview.finish(scene);
        if original.instance.is_none() {
            scene.despawn(pose.instance);
        } else {
            scene.set_transform(pose.instance, original.position, original.rotation);
        }

        world
            .ledger
            .occupy(original.kind.layer(), &original.footprint);
        for (cell, stored) in modifiers {
            world.ledger.restore_speed_modifier(cell, stored);
        }

        let id = original.id;
        world.entities.registry_mut(original.kind).insert(original);
        world.events.push(PlacementEvent::MoveRolledBack { id });
        tracing::info!("Move of entity {} rolled back", id);

        self.state = MoveState::Idle;
    }

    fn commit(&mut self, world: &mut PlacementWorld, scene: &mut dyn Scene) -> bool {
        let Some(carried) = self.carried.as_ref() else {
            return false;
        };
        if !carried.preview.is_valid() {
            tracing::debug!("Move confirm ignored: destination is invalid");
            return false;
        }
        let Some(prefab) = world.catalog.get(carried.original.type_index) else {
            return false;
        };
        let rotation = carried.preview.orientation(prefab);
        let position = carried.preview.position();
        let footprint = carried.preview.footprint().clone();
        let entrance = world.entrance_for(prefab, position, rotation);

        let Some(Carried {
            original, preview, ..
        }) = self.carried.take()
        else {
            return false;
        };

        let angle = preview.angle();
        let pose = preview.finish(scene);
        let from = original.footprint.to_vec();

        let moved = PlacedEntity {
            position,
            rotation,
            angle,
            footprint,
            entrance,
            instance: Some(pose.instance),
            ..original
        };

        world.claim(&moved);
        world.events.push(PlacementEvent::Moved {
            id: moved.id,
            from,
            to: moved.footprint.to_vec(),
        });
        tracing::info!("Moved entity {} to {:?}", moved.id, moved.position);
        world.entities.registry_mut(moved.kind).insert(moved);

        true
    }
}

impl Tool for MoveTool {
    fn mode(&self) -> ToolMode {
        ToolMode::Move
    }

    fn activate(
        &mut self,
        _world: &mut PlacementWorld,
        _scene: &mut dyn Scene,
        _cursor: Option<Vec2>,
    ) -> bool {
        self.cancel_click.reset();
        self.state = MoveState::Selecting;
        true
    }

    fn deactivate(&mut self, world: &mut PlacementWorld, scene: &mut dyn Scene) {
        if self.carried.is_some() {
            self.rollback(world, scene);
        }
        self.cancel_click.reset();
        self.state = MoveState::Idle;
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
            self.rollback(world, scene);
            return ToolSignal::Exit;
        }

        match self.state {
            MoveState::Idle => ToolSignal::Exit,
            MoveState::Selecting => {
                if input.primary.just_pressed {
                    if let Some(id) = input.cursor.and_then(|cursor| scene.pick_entity(cursor)) {
                        self.pick(world, scene, id);
                    }
                }
                ToolSignal::Continue
            }
            MoveState::Dragging => {
                let Some(carried) = self.carried.as_mut() else {
                    self.state = MoveState::Selecting;
                    return ToolSignal::Continue;
                };
                if let Some(prefab) = world.catalog.get(carried.original.type_index) {
                    carried.preview.update(world, scene, prefab, input);
                }

                if !input.primary.just_pressed || !self.commit(world, scene) {
                    return ToolSignal::Continue;
                }

                if input.modifier {
                    self.state = MoveState::Selecting;
                    ToolSignal::Continue
                } else {
                    self.state = MoveState::Idle;
                    ToolSignal::Exit
                }
            }
        }
    }

    fn preview(&self) -> Option<&PlacementPreview> {
        self.carried.as_ref().map(|carried| &carried.preview)
    }
}
