//! Shared placement state and the single confirm path.
//!
//! [`PlacementWorld`] bundles the services every tool is handed each tick:
//! grid, tuning, catalog, ledger, entity registries and the event log.
//! Interactive confirms and save loading both go through
//! [`PlacementWorld::confirm`], so a loaded world is indistinguishable from
//! one built by hand.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use crate::catalog::{Catalog, PrefabDef};
use crate::config::PlacementConfig;
use crate::entity::{EntityId, EntityKind, EntityStore, PlacedEntity};
use crate::events::PlacementEvent;
use crate::grid::{Cell, Footprint, GridCoordinateSystem};
use crate::ledger::OccupancyLedger;
use crate::rotation::normalize_degrees;
use crate::scene::{InstanceId, Scene};

/// A request to materialise a placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Keep this id instead of generating one (save loading).
    pub id: Option<EntityId>,
    /// Catalog index.
    pub type_index: usize,
    /// Pivot position.
    pub position: Vec3,
    /// Player rotation in degrees.
    pub angle: f32,
    /// Instance already rendering the object, if any.
    pub instance: Option<InstanceId>,
    /// Override the catalog speed modifier (save loading).
    pub speed_modifier: Option<f32>,
}

/// Services shared by every tool.
#[derive(Debug, Clone)]
pub struct PlacementWorld {
    /// World/cell conversion.
    pub grid: GridCoordinateSystem,
    /// Tunables.
    pub config: PlacementConfig,
    /// Placeable prefabs.
    pub catalog: Catalog,
    /// Cell occupancy and speed modifiers.
    pub ledger: OccupancyLedger,
    /// Placed entities, one registry per owning tool.
    pub entities: EntityStore,
    /// Events since the host last drained them.
    pub events: Vec<PlacementEvent>,
}

impl PlacementWorld {
    /// Create an empty world.
    ///
    /// # Panics
    /// Panics if `config.cell_size` is not positive; [`crate::controller::ToolController::new`]
    /// validates the config first.
    #[must_use]
    pub fn new(config: PlacementConfig, catalog: Catalog) -> Self {
        Self {
            grid: GridCoordinateSystem::from_config(&config),
            config,
            catalog,
            ledger: OccupancyLedger::new(),
            entities: EntityStore::new(),
            events: Vec::new(),
        }
    }

    /// Orientation of `prefab` turned by a player angle.
    #[must_use]
    pub fn orientation(prefab: &PrefabDef, angle: f32) -> Quat {
        prefab.base_orientation() * Quat::from_rotation_y(angle.to_radians())
    }

    /// Cells `prefab` would cover at a pose.
    #[must_use]
    pub fn footprint_for(&self, prefab: &PrefabDef, position: Vec3, rotation: Quat) -> Footprint {
        self.grid.footprint_of(&prefab.bounds_at(position, rotation))
    }

    /// Entrance cell of `prefab` at a pose.
    #[must_use]
    pub fn entrance_for(&self, prefab: &PrefabDef, position: Vec3, rotation: Quat) -> Option<Cell> {
        prefab
            .entrance_at(position, rotation)
            .map(|point| self.grid.cell_of(point))
    }

    /// Whether a footprint could be claimed by an entity of `kind`.
    ///
    /// Degenerate (empty) footprints never can.
    #[must_use]
    pub fn can_occupy(&self, kind: EntityKind, footprint: &Footprint) -> bool {
        !footprint.is_empty() && self.ledger.are_free(kind.layer(), footprint)
    }

    /// Materialise a placement: claim its cells, register it and record a
    /// [`PlacementEvent::Placed`].
    ///
    /// Returns `None` (and changes nothing) when the type is unknown, the
    /// footprint is degenerate or occupied, or the id is already taken.
    pub fn confirm(&mut self, placement: Placement) -> Option<EntityId> {
        let Some(prefab) = self.catalog.get(placement.type_index) else {
            tracing::warn!("Confirm refused: unknown type index {}", placement.type_index);
            return None;
        };

        let kind = EntityKind::from(prefab.kind);
        let angle = normalize_degrees(placement.angle);
        let rotation = Self::orientation(prefab, angle);
        let footprint = self.footprint_for(prefab, placement.position, rotation);

        if !self.can_occupy(kind, &footprint) {
            tracing::debug!(
                "Confirm refused: '{}' at {:?} covers no free cells",
                prefab.name,
                placement.position
            );
            return None;
        }

        if let Some(id) = placement.id {
            if self.entities.get(id).is_some() {
                tracing::warn!("Confirm refused: entity {} already exists", id);
                return None;
            }
        }

        let entity = PlacedEntity {
            id: placement.id.unwrap_or_else(EntityId::generate),
            type_index: placement.type_index,
            kind,
            position: placement.position,
            rotation,
            angle,
            entrance: self.entrance_for(prefab, placement.position, rotation),
            speed_modifier: placement.speed_modifier.unwrap_or(prefab.speed_modifier),
            footprint,
            instance: placement.instance,
        };
        let id = entity.id;

        tracing::info!(
            "Placed '{}' {} on {} cells at {:?}",
            prefab.name,
            id,
            entity.footprint.len(),
            entity.position
        );

        self.claim(&entity);
        self.events.push(PlacementEvent::Placed {
            id,
            type_index: entity.type_index,
            kind,
        });
        self.entities.registry_mut(kind).insert(entity);
        self.validate_after_mutation();

        Some(id)
    }

    /// Write an entity's footprint into the ledger: occupancy, its speed
    /// modifier, then a neutral modifier on its entrance cell.
    pub fn claim(&mut self, entity: &PlacedEntity) {
        self.ledger.occupy(entity.kind.layer(), &entity.footprint);
        self.ledger
            .set_speed_modifier(&entity.footprint, entity.speed_modifier);
        if let Some(entrance) = entity.entrance {
            self.ledger.set_speed_modifier([entrance], 0.0);
        }
    }

    /// Remove an entity's footprint from the ledger, returning the modifier
    /// each touched cell held so the exact prior state can be restored.
    ///
    /// `entity` must already be out of its registry. Modifiers that other
    /// entities own on the touched cells are written back, so a path under
    /// a removed building keeps its speed.
    pub fn vacate(&mut self, entity: &PlacedEntity) -> BTreeMap<Cell, Option<f32>> {
        let touched: BTreeMap<Cell, Option<f32>> = entity
            .footprint
            .iter()
            .chain(entity.entrance)
            .map(|cell| (cell, self.ledger.stored_speed_modifier(cell)))
            .collect();

        self.ledger.release(entity.kind.layer(), &entity.footprint);
        self.ledger.clear_speed_modifier(touched.keys().copied());
        self.reapply_speed_modifiers(&touched);

        touched
    }

    /// Rewrite the modifiers registered entities own on `cells`: path
    /// tiles, then buildings, then entrance cells.
    fn reapply_speed_modifiers<V>(&mut self, cells: &BTreeMap<Cell, V>) {
        let mut writes: Vec<(Cell, f32)> = Vec::new();
        for kind in [EntityKind::Path, EntityKind::Structure] {
            for owner in self.entities.registry(kind).iter() {
                writes.extend(
                    owner
                        .footprint
                        .iter()
                        .filter(|cell| cells.contains_key(cell))
                        .map(|cell| (cell, owner.speed_modifier)),
                );
            }
        }
        writes.extend(
            self.entities
                .iter()
                .filter_map(|owner| owner.entrance)
                .filter(|cell| cells.contains_key(cell))
                .map(|cell| (cell, 0.0)),
        );

        for (cell, value) in writes {
            self.ledger.set_speed_modifier([cell], value);
        }
    }

    /// Remove an entity entirely: ledger, registry and instance.
    ///
    /// Returns `false` for an unknown id.
    pub fn remove(&mut self, id: EntityId, scene: &mut dyn Scene) -> bool {
        let Some(kind) = self.entities.kind_of(id) else {
            tracing::warn!("Remove ignored: unknown entity {}", id);
            return false;
        };
        let Some(entity) = self.entities.registry_mut(kind).remove(id) else {
            return false;
        };

        self.vacate(&entity);
        if let Some(instance) = entity.instance {
            scene.despawn(instance);
        }

        tracing::info!("Removed entity {} ({:?})", id, kind);
        self.events.push(PlacementEvent::Removed { id, kind });
        self.validate_after_mutation();

        true
    }

    /// Every violation of the occupancy invariant: a cell occupied with
    /// no owner, an owned cell not occupied, or a cell owned twice within
    /// one layer. Empty when the ledger and registries agree.
    #[must_use]
    pub fn audit(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for kind in [EntityKind::Structure, EntityKind::Path] {
            let layer = kind.layer();
            let mut owners: BTreeMap<Cell, EntityId> = BTreeMap::new();

            for entity in self.entities.registry(kind).iter() {
                for cell in &entity.footprint {
                    if let Some(other) = owners.insert(cell, entity.id) {
                        problems.push(format!(
                            "{layer:?} cell {cell} claimed by both {other} and {}",
                            entity.id
                        ));
                    }
                    if !self.ledger.is_occupied(layer, cell) {
                        problems.push(format!(
                            "{layer:?} cell {cell} owned by {} but not occupied",
                            entity.id
                        ));
                    }
                }
            }

            for cell in self.ledger.occupied(layer) {
                if !owners.contains_key(&cell) {
                    problems.push(format!("{layer:?} cell {cell} occupied with no owner"));
                }
            }
        }

        problems
    }

    /// Forget every entity and ledger entry without touching instances.
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.entities = EntityStore::new();
    }

    #[cfg(feature = "debug-validation")]
    fn validate_after_mutation(&self) {
        let problems = self.audit();
        debug_assert!(problems.is_empty(), "Ledger audit failed: {problems:?}");
    }

    #[cfg(not(feature = "debug-validation"))]
    #[inline]
    fn validate_after_mutation(&self) {}
}
