//! Recording fake scene.
//!
//! Screen coordinates map one-to-one onto the ground plane: screen
//! `(x, y)` is world `(x, height, y)`. Every visual request is recorded so
//! tests can assert on what the tools asked the renderer to do.

use std::collections::BTreeMap;

use glam::{Quat, Vec2, Vec3};
use township_core::controller::ToolController;
use township_core::entity::EntityId;
use township_core::grid::{Cell, GridCoordinateSystem};
use township_core::scene::{EntityPicker, GroundProjector, InstanceId, Tint, VisualDelegate};

/// One live instance as last described by the tools.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeInstance {
    /// Catalog index.
    pub type_index: usize,
    /// Last position.
    pub position: Vec3,
    /// Last rotation.
    pub rotation: Quat,
    /// Drawn translucent.
    pub ghost: bool,
    /// Last tint, `None` once appearance was restored.
    pub tint: Option<Tint>,
}

/// Scene double for tool tests.
#[derive(Debug, Clone)]
pub struct FakeScene {
    ground_hit: bool,
    ground_height: f32,
    grid: GridCoordinateSystem,
    next_instance: u64,
    picks: BTreeMap<Cell, EntityId>,
    /// Live instances.
    pub instances: BTreeMap<InstanceId, FakeInstance>,
    /// Instances destroyed, in order.
    pub despawned: Vec<InstanceId>,
    /// Every tint request, in order.
    pub tints: Vec<(InstanceId, Tint)>,
}

impl Default for FakeScene {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeScene {
    /// Ground everywhere at height 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ground_hit: true,
            ground_height: 0.0,
            grid: GridCoordinateSystem::default(),
            next_instance: 0,
            picks: BTreeMap::new(),
            instances: BTreeMap::new(),
            despawned: Vec::new(),
            tints: Vec::new(),
        }
    }

    /// Make cursor rays hit (or miss) the ground.
    pub fn set_ground_hit(&mut self, hit: bool) {
        self.ground_hit = hit;
    }

    /// Height reported for ground hits.
    pub fn set_ground_height(&mut self, height: f32) {
        self.ground_height = height;
    }

    /// Rebuild the picking map from the controller's placed entities,
    /// buildings taking precedence over paths.
    pub fn sync_picking(&mut self, controller: &ToolController) {
        self.grid = *controller.grid();
        self.picks.clear();
        let (buildings, paths): (Vec<_>, Vec<_>) =
            controller.entities().partition(|entity| entity.is_blocking());
        for entity in paths.into_iter().chain(buildings) {
            for cell in &entity.footprint {
                self.picks.insert(cell, entity.id);
            }
        }
    }

    /// Number of live instances.
    #[must_use]
    pub fn live(&self) -> usize {
        self.instances.len()
    }

    /// Live ghost instances (previews).
    #[must_use]
    pub fn ghosts(&self) -> usize {
        self.instances.values().filter(|instance| instance.ghost).count()
    }

    /// Last tint of an instance.
    #[must_use]
    pub fn tint_of(&self, instance: InstanceId) -> Option<Tint> {
        self.instances.get(&instance).and_then(|instance| instance.tint)
    }
}

impl GroundProjector for FakeScene {
    fn project_to_ground(&self, screen: Vec2) -> Option<Vec3> {
        self.ground_hit
            .then(|| Vec3::new(screen.x, self.ground_height, screen.y))
    }
}

impl EntityPicker for FakeScene {
    fn pick_entity(&self, screen: Vec2) -> Option<EntityId> {
        let point = self.project_to_ground(screen)?;
        self.picks.get(&self.grid.cell_of(point)).copied()
    }
}

impl VisualDelegate for FakeScene {
    fn spawn_instance(
        &mut self,
        type_index: usize,
        position: Vec3,
        rotation: Quat,
        ghost: bool,
    ) -> InstanceId {
        self.next_instance += 1;
        let id = InstanceId(self.next_instance);
        self.instances.insert(
            id,
            FakeInstance {
                type_index,
                position,
                rotation,
                ghost,
                tint: None,
            },
        );
        id
    }

    fn set_transform(&mut self, instance: InstanceId, position: Vec3, rotation: Quat) {
        if let Some(instance) = self.instances.get_mut(&instance) {
            instance.position = position;
            instance.rotation = rotation;
        }
    }

    fn set_tint(&mut self, instance: InstanceId, tint: Tint) {
        self.tints.push((instance, tint));
        if let Some(instance) = self.instances.get_mut(&instance) {
            instance.tint = Some(tint);
        }
    }

    fn restore_appearance(&mut self, instance: InstanceId) {
        if let Some(instance) = self.instances.get_mut(&instance) {
            instance.ghost = false;
            instance.tint = None;
        }
    }

    fn despawn(&mut self, instance: InstanceId) {
        self.instances.remove(&instance);
        self.despawned.push(instance);
    }
}
