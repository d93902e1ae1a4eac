//! Placement preview.
//!
//! The ghost instance that follows the cursor while a tool is placing or
//! moving something. A preview never touches the ledger: it only reads it
//! to decide whether its current footprint is free.

use glam::{Quat, Vec2, Vec3};

use crate::catalog::PrefabDef;
use crate::entity::EntityKind;
use crate::grid::Footprint;
use crate::input::TickInput;
use crate::placement::PlacementWorld;
use crate::rotation::RotationController;
use crate::scene::{InstanceId, Scene, Tint};

/// Transient state of the object under the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPreview {
    type_index: usize,
    kind: EntityKind,
    instance: InstanceId,
    position: Vec3,
    anchored: bool,
    rotation: RotationController,
    footprint: Footprint,
    valid: bool,
    tint: Option<Tint>,
}

/// Where a confirmed preview ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewPose {
    /// Pivot position.
    pub position: Vec3,
    /// Player rotation in degrees.
    pub angle: f32,
    /// Instance that rendered the preview.
    pub instance: InstanceId,
}

impl PlacementPreview {
    /// Spawn a fresh ghost of catalog entry `type_index`.
    ///
    /// The ghost starts under `cursor` when the ground is hit there and
    /// waits at the grid origin otherwise; until it has been positioned
    /// once it is never valid.
    pub fn spawn(
        world: &PlacementWorld,
        scene: &mut dyn Scene,
        type_index: usize,
        prefab: &PrefabDef,
        rotation: RotationController,
        cursor: Option<Vec2>,
    ) -> Self {
        let hit = project(world, scene, cursor);
        let position = hit.unwrap_or(world.grid.origin());
        let orientation = rotation.orientation(prefab.base_orientation());
        let instance = scene.spawn_instance(type_index, position, orientation, true);

        tracing::debug!("Spawned preview of '{}' ({:?})", prefab.name, instance);

        let mut preview = Self {
            type_index,
            kind: prefab.kind.into(),
            instance,
            position,
            anchored: hit.is_some(),
            rotation,
            footprint: Footprint::empty(),
            valid: false,
            tint: None,
        };
        preview.refresh(world, scene, prefab);
        preview
    }

    /// Turn an existing instance into a preview, as the move tool does
    /// with the entity being relocated.
    ///
    /// When the entity has no instance (it was loaded headless) a ghost
    /// is spawned for it and becomes its instance on commit.
    pub fn adopt(
        world: &PlacementWorld,
        scene: &mut dyn Scene,
        type_index: usize,
        prefab: &PrefabDef,
        instance: Option<InstanceId>,
        position: Vec3,
        rotation: RotationController,
    ) -> Self {
        let orientation = rotation.orientation(prefab.base_orientation());
        let instance = instance
            .unwrap_or_else(|| scene.spawn_instance(type_index, position, orientation, true));

        let mut preview = Self {
            type_index,
            kind: prefab.kind.into(),
            instance,
            position,
            anchored: true,
            rotation,
            footprint: Footprint::empty(),
            valid: false,
            tint: None,
        };
        preview.refresh(world, scene, prefab);
        preview
    }

    /// Catalog index being previewed.
    #[must_use]
    pub const fn type_index(&self) -> usize {
        self.type_index
    }

    /// Instance rendering the preview.
    #[must_use]
    pub const fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Current pivot position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Current rotation angle in degrees.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.rotation.angle()
    }

    /// Rotation state machine driving this preview.
    #[must_use]
    pub const fn rotation(&self) -> &RotationController {
        &self.rotation
    }

    /// Cells under the preview.
    #[must_use]
    pub const fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// Whether a confirm would succeed right now.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// World orientation for `prefab`.
    #[must_use]
    pub fn orientation(&self, prefab: &PrefabDef) -> Quat {
        self.rotation.orientation(prefab.base_orientation())
    }

    /// Per-tick update: rotate, follow the cursor, revalidate, retint.
    ///
    /// A cursor that misses the ground leaves the preview where it was.
    pub fn update(
        &mut self,
        world: &PlacementWorld,
        scene: &mut dyn Scene,
        prefab: &PrefabDef,
        input: &TickInput,
    ) {
        self.rotation.update(input.rotate, input.time);

        if let Some(hit) = project(world, scene, input.cursor) {
            self.position = hit;
            self.anchored = true;
        }

        self.refresh(world, scene, prefab);
    }

    /// Recompute footprint and validity for the current pose and push the
    /// transform and tint to the scene.
    pub fn refresh(&mut self, world: &PlacementWorld, scene: &mut dyn Scene, prefab: &PrefabDef) {
        let orientation = self.orientation(prefab);
        self.footprint = world.footprint_for(prefab, self.position, orientation);

        let valid = self.anchored && world.can_occupy(self.kind, &self.footprint);
        if valid != self.valid {
            tracing::trace!(
                "Preview {:?} became {} at {:?}",
                self.instance,
                if valid { "valid" } else { "invalid" },
                self.position
            );
        }
        self.valid = valid;

        scene.set_transform(self.instance, self.position, orientation);

        let tint = if valid { Tint::Valid } else { Tint::Invalid };
        if self.tint != Some(tint) {
            scene.set_tint(self.instance, tint);
            self.tint = Some(tint);
        }
    }

    /// Hand the instance over to a committed entity: full appearance is
    /// restored and the instance stays alive.
    pub fn finish(self, scene: &mut dyn Scene) -> PreviewPose {
        scene.restore_appearance(self.instance);
        PreviewPose {
            position: self.position,
            angle: self.rotation.angle(),
            instance: self.instance,
        }
    }

    /// Drop the preview and destroy its instance.
    pub fn cancel(self, scene: &mut dyn Scene) {
        tracing::debug!("Cancelled preview {:?}", self.instance);
        scene.despawn(self.instance);
    }
}

/// Cursor projected onto the ground and snapped, keeping the hit height.
fn project(world: &PlacementWorld, scene: &dyn Scene, cursor: Option<Vec2>) -> Option<Vec3> {
    let hit = scene.project_to_ground(cursor?)?;
    let snapped = world.grid.snap_to_grid(hit);
    Some(Vec3::new(snapped.x, hit.y, snapped.z))
}
