//! Sprite-backed scene for the placement tools.
//!
//! The core talks to a [`FrameScene`] while it ticks. Visual requests land
//! in the [`SceneMirror`] resource, and [`sync_instance_sprites`] turns the
//! accumulated changes into sprite entities afterwards. The ground is the
//! 2D world plane: world `(x, z)` is drawn at sprite `(x, y)`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bevy::prelude::*;
use bevy::sprite::Anchor;
use township_core::catalog::PrefabKind;
use township_core::controller::ToolController;
use township_core::entity::EntityId;
use township_core::grid::{Cell, GridCoordinateSystem};
use township_core::scene::{EntityPicker, GroundProjector, InstanceId, Tint, VisualDelegate};

use crate::construction::Township;

/// Sprite pixels per world unit.
pub const PIXELS_PER_UNIT: f32 = 32.0;

const PATH_LAYER: f32 = -0.5;
const BUILDING_LAYER: f32 = 0.0;
const GHOST_LAYER: f32 = 0.5;

/// Sprite-space point of a world position.
#[must_use]
pub fn world_to_sprite(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z) * PIXELS_PER_UNIT
}

/// Ground-plane world position of a sprite-space point.
#[must_use]
pub fn sprite_to_world(point: Vec2) -> Vec3 {
    Vec3::new(point.x / PIXELS_PER_UNIT, 0.0, point.y / PIXELS_PER_UNIT)
}

/// Sprite rotation for a world orientation.
///
/// A yaw about +Y turns +X towards -Z, which on the sprite plane is a
/// clockwise turn about +Z.
#[must_use]
pub fn sprite_rotation(rotation: Quat) -> Quat {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_rotation_z(-yaw)
}

// ============================================================================
// Mirror
// ============================================================================

/// Last requested state of one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceVisual {
    /// Catalog index.
    pub type_index: usize,
    /// World pivot.
    pub position: Vec3,
    /// World orientation.
    pub rotation: Quat,
    /// Drawn translucent.
    pub ghost: bool,
    /// Requested tint, `None` for authored colours.
    pub tint: Option<Tint>,
}

/// Everything the tools asked the renderer to show.
#[derive(Resource, Debug, Default)]
pub struct SceneMirror {
    next_instance: u64,
    instances: BTreeMap<InstanceId, InstanceVisual>,
    dirty: BTreeSet<InstanceId>,
    despawned: Vec<InstanceId>,
}

impl SceneMirror {
    /// Visual state of an instance.
    #[must_use]
    pub fn get(&self, instance: InstanceId) -> Option<&InstanceVisual> {
        self.instances.get(&instance)
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instance is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of live ghost instances.
    #[must_use]
    pub fn ghosts(&self) -> usize {
        self.instances.values().filter(|visual| visual.ghost).count()
    }

    /// Take the instances changed and destroyed since the last call.
    pub fn take_changes(&mut self) -> (Vec<(InstanceId, InstanceVisual)>, Vec<InstanceId>) {
        let changed = std::mem::take(&mut self.dirty)
            .into_iter()
            .filter_map(|id| self.instances.get(&id).map(|visual| (id, visual.clone())))
            .collect();
        (changed, std::mem::take(&mut self.despawned))
    }

    fn touch(&mut self, instance: InstanceId, edit: impl FnOnce(&mut InstanceVisual)) {
        if let Some(visual) = self.instances.get_mut(&instance) {
            edit(visual);
            self.dirty.insert(instance);
        }
    }
}

// ============================================================================
// Frame scene
// ============================================================================

/// The scene handed to the core for one frame.
pub struct FrameScene<'a> {
    mirror: &'a mut SceneMirror,
    view: Option<(&'a Camera, &'a GlobalTransform)>,
    grid: GridCoordinateSystem,
    picks: HashMap<Cell, EntityId>,
}

impl<'a> FrameScene<'a> {
    /// Scene over `mirror`, projecting through `view` when a camera exists.
    pub fn new(mirror: &'a mut SceneMirror, view: Option<(&'a Camera, &'a GlobalTransform)>) -> Self {
        Self {
            mirror,
            view,
            grid: GridCoordinateSystem::default(),
            picks: HashMap::new(),
        }
    }

    /// Snapshot what can be picked. Buildings cover paths on shared cells.
    #[must_use]
    pub fn with_picking(mut self, controller: &ToolController) -> Self {
        self.grid = *controller.grid();
        self.picks.clear();
        let (buildings, paths): (Vec<_>, Vec<_>) =
            controller.entities().partition(|entity| entity.is_blocking());
        for entity in paths.into_iter().chain(buildings) {
            for cell in &entity.footprint {
                self.picks.insert(cell, entity.id);
            }
        }
        self
    }
}

impl GroundProjector for FrameScene<'_> {
    fn project_to_ground(&self, screen: Vec2) -> Option<Vec3> {
        let (camera, transform) = self.view?;
        camera
            .viewport_to_world_2d(transform, screen)
            .map(sprite_to_world)
    }
}

impl EntityPicker for FrameScene<'_> {
    fn pick_entity(&self, screen: Vec2) -> Option<EntityId> {
        let point = self.project_to_ground(screen)?;
        self.picks.get(&self.grid.cell_of(point)).copied()
    }
}

impl VisualDelegate for FrameScene<'_> {
    fn spawn_instance(
        &mut self,
        type_index: usize,
        position: Vec3,
        rotation: Quat,
        ghost: bool,
    ) -> InstanceId {
        self.mirror.next_instance += 1;
        let id = InstanceId(self.mirror.next_instance);
        self.mirror.instances.insert(
            id,
            InstanceVisual {
                type_index,
                position,
                rotation,
                ghost,
                tint: None,
            },
        );
        self.mirror.dirty.insert(id);
        id
    }

    fn set_transform(&mut self, instance: InstanceId, position: Vec3, rotation: Quat) {
        self.mirror.touch(instance, |visual| {
            visual.position = position;
            visual.rotation = rotation;
        });
    }

    fn set_tint(&mut self, instance: InstanceId, tint: Tint) {
        self.mirror.touch(instance, |visual| visual.tint = Some(tint));
    }

    fn restore_appearance(&mut self, instance: InstanceId) {
        self.mirror.touch(instance, |visual| {
            visual.ghost = false;
            visual.tint = None;
        });
    }

    fn despawn(&mut self, instance: InstanceId) {
        if self.mirror.instances.remove(&instance).is_some() {
            self.mirror.dirty.remove(&instance);
            self.mirror.despawned.push(instance);
        }
    }
}

// ============================================================================
// Sprites
// ============================================================================

/// Links a sprite to the instance it draws.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementInstance {
    /// Instance handle given to the core.
    pub instance: InstanceId,
    /// Catalog index.
    pub type_index: usize,
}

/// Sprite entity per live instance.
#[derive(Resource, Debug, Default)]
pub struct InstanceMap {
    entities: HashMap<InstanceId, Entity>,
}

impl InstanceMap {
    /// Sprite entity drawing `instance`.
    #[must_use]
    pub fn entity(&self, instance: InstanceId) -> Option<Entity> {
        self.entities.get(&instance).copied()
    }

    /// Number of sprites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no sprite exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Sprite colour for an instance.
#[must_use]
pub fn instance_color(base: [u8; 3], visual: &InstanceVisual) -> Color {
    match visual.tint {
        Some(Tint::Valid) => Color::srgba(0.0, 1.0, 0.0, 0.4),
        Some(Tint::Invalid) => Color::srgba(1.0, 0.0, 0.0, 0.4),
        Some(Tint::Highlight) => Color::srgba(1.0, 0.85, 0.2, 0.9),
        None => {
            let color = Color::srgb_u8(base[0], base[1], base[2]);
            if visual.ghost {
                color.with_alpha(0.5)
            } else {
                color
            }
        }
    }
}

/// Apply the mirror's changes to sprite entities.
pub fn sync_instance_sprites(
    mut commands: Commands,
    mut mirror: ResMut<SceneMirror>,
    mut instances: ResMut<InstanceMap>,
    township: Res<Township>,
    mut sprites: Query<(&mut Sprite, &mut Transform)>,
) {
    let (changed, despawned) = mirror.take_changes();

    for instance in despawned {
        if let Some(entity) = instances.entities.remove(&instance) {
            commands.entity(entity).despawn_recursive();
        }
    }

    for (instance, visual) in changed {
        let Some(prefab) = township.controller.catalog().get(visual.type_index) else {
            tracing::warn!(
                "No prefab {} for instance {:?}, not drawn",
                visual.type_index,
                instance
            );
            continue;
        };

        let layer = if visual.ghost {
            GHOST_LAYER
        } else if prefab.kind == PrefabKind::Path {
            PATH_LAYER
        } else {
            BUILDING_LAYER
        };
        let color = instance_color(prefab.color, &visual);
        let transform = Transform::from_translation(world_to_sprite(visual.position).extend(layer))
            .with_rotation(sprite_rotation(visual.rotation));

        if let Some(entity) = instances.entity(instance) {
            if let Ok((mut sprite, mut current)) = sprites.get_mut(entity) {
                sprite.color = color;
                *current = transform;
                continue;
            }
        }

        let entity = commands
            .spawn(SpriteBundle {
                sprite: Sprite {
                    color,
                    custom_size: Some(prefab.size * PIXELS_PER_UNIT),
                    anchor: Anchor::BottomLeft,
                    ..default()
                },
                transform,
                ..default()
            })
            .insert(PlacementInstance {
                instance,
                type_index: visual.type_index,
            })
            .id();
        instances.entities.insert(instance, entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_sprite_round_trip() {
        let world = Vec3::new(2.5, 0.0, -4.0);
        let sprite = world_to_sprite(world);
        assert_eq!(sprite, Vec2::new(80.0, -128.0));
        assert_eq!(sprite_to_world(sprite), world);
    }

    #[test]
    fn test_sprite_rotation_matches_world_yaw() {
        let world = Quat::from_rotation_y(90f32.to_radians());
        let local_x = world * Vec3::X;
        let sprite = sprite_rotation(world) * Vec3::X;

        // World +X turns to -Z, drawn as sprite -Y.
        assert!((sprite.x - local_x.x).abs() < 1e-5);
        assert!((sprite.y - local_x.z).abs() < 1e-5);
    }

    #[test]
    fn test_mirror_records_changes_once() {
        let mut mirror = SceneMirror::default();
        let id = {
            let mut scene = FrameScene::new(&mut mirror, None);
            let id = scene.spawn_instance(0, Vec3::ZERO, Quat::IDENTITY, true);
            scene.set_tint(id, Tint::Invalid);
            id
        };

        let (changed, despawned) = mirror.take_changes();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].1.tint, Some(Tint::Invalid));
        assert!(despawned.is_empty());

        let (changed, _) = mirror.take_changes();
        assert!(changed.is_empty());
        assert_eq!(mirror.ghosts(), 1);
        assert!(mirror.get(id).is_some());
    }

    #[test]
    fn test_despawn_drops_pending_change() {
        let mut mirror = SceneMirror::default();
        {
            let mut scene = FrameScene::new(&mut mirror, None);
            let id = scene.spawn_instance(1, Vec3::ZERO, Quat::IDENTITY, false);
            scene.despawn(id);
        }

        let (changed, despawned) = mirror.take_changes();
        assert!(changed.is_empty());
        assert_eq!(despawned.len(), 1);
        assert!(mirror.is_empty());
    }

    #[test]
    fn test_scene_without_camera_misses_ground() {
        let mut mirror = SceneMirror::default();
        let scene = FrameScene::new(&mut mirror, None);
        assert_eq!(scene.project_to_ground(Vec2::new(10.0, 10.0)), None);
        assert_eq!(scene.pick_entity(Vec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_tint_colors() {
        let visual = InstanceVisual {
            type_index: 0,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            ghost: true,
            tint: Some(Tint::Valid),
        };
        assert_eq!(instance_color([0, 0, 0], &visual), Color::srgba(0.0, 1.0, 0.0, 0.4));

        let restored = InstanceVisual {
            ghost: false,
            tint: None,
            ..visual
        };
        assert_eq!(instance_color([255, 0, 0], &restored), Color::srgb_u8(255, 0, 0));
    }
}
