//! Placed entity records and the registries that own them.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::PrefabKind;
use crate::grid::{Cell, Footprint};
use crate::ledger::OccupancyLayer;
use crate::scene::InstanceId;

/// Globally unique, save-stable entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Which tool owns an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Blocking building, owned by the build tool.
    Structure,
    /// Non-blocking path tile, owned by the path tool.
    Path,
}

impl EntityKind {
    /// Occupancy layer the entity's footprint lives in.
    #[must_use]
    pub const fn layer(self) -> OccupancyLayer {
        match self {
            EntityKind::Structure => OccupancyLayer::Structures,
            EntityKind::Path => OccupancyLayer::Paths,
        }
    }
}

impl From<PrefabKind> for EntityKind {
    fn from(kind: PrefabKind) -> Self {
        match kind {
            PrefabKind::Building => EntityKind::Structure,
            PrefabKind::Path => EntityKind::Path,
        }
    }
}

/// A confirmed placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEntity {
    /// Identifier, generated once at first confirm.
    pub id: EntityId,
    /// Catalog index.
    pub type_index: usize,
    /// Owning tool.
    pub kind: EntityKind,
    /// Pivot position.
    pub position: Vec3,
    /// World orientation (authored yaw plus player rotation).
    pub rotation: Quat,
    /// Player rotation in degrees, kept so moves resume from it.
    pub angle: f32,
    /// Covered cells.
    pub footprint: Footprint,
    /// Modifier written to the covered cells.
    pub speed_modifier: f32,
    /// Cell kept at a neutral modifier so the entity stays reachable.
    pub entrance: Option<Cell>,
    /// Host instance rendering this entity.
    pub instance: Option<InstanceId>,
}

impl PlacedEntity {
    /// Whether the entity blocks other buildings.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self.kind, EntityKind::Structure)
    }
}

/// Entities owned by one tool, indexed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, PlacedEntity>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity, replacing any previous record with the same id.
    pub fn insert(&mut self, entity: PlacedEntity) -> Option<PlacedEntity> {
        self.entities.insert(entity.id, entity)
    }

    /// Unregister an entity.
    pub fn remove(&mut self, id: EntityId) -> Option<PlacedEntity> {
        self.entities.remove(&id)
    }

    /// Look up an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&PlacedEntity> {
        self.entities.get(&id)
    }

    /// Look up an entity mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut PlacedEntity> {
        self.entities.get_mut(&id)
    }

    /// Whether an id is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.entities.values()
    }

    /// Registered ids in order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Entity whose footprint covers `cell`.
    #[must_use]
    pub fn at_cell(&self, cell: Cell) -> Option<&PlacedEntity> {
        self.iter().find(|entity| entity.footprint.contains(cell))
    }
}

/// The per-tool registries side by side.
///
/// Kept together so the move and destroy tools can reach whichever tool
/// owns an entity without going through that tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    structures: EntityRegistry,
    paths: EntityRegistry,
}

impl EntityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of one owner.
    #[must_use]
    pub fn registry(&self, kind: EntityKind) -> &EntityRegistry {
        match kind {
            EntityKind::Structure => &self.structures,
            EntityKind::Path => &self.paths,
        }
    }

    /// Mutable registry of one owner.
    pub fn registry_mut(&mut self, kind: EntityKind) -> &mut EntityRegistry {
        match kind {
            EntityKind::Structure => &mut self.structures,
            EntityKind::Path => &mut self.paths,
        }
    }

    /// Find an entity in either registry.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&PlacedEntity> {
        self.structures.get(id).or_else(|| self.paths.get(id))
    }

    /// Find an entity mutably in either registry.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut PlacedEntity> {
        match self.structures.get_mut(id) {
            Some(entity) => Some(entity),
            None => self.paths.get_mut(id),
        }
    }

    /// Owner of an id.
    #[must_use]
    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.get(id).map(|entity| entity.kind)
    }

    /// Total entity count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.structures.len() + self.paths.len()
    }

    /// Whether no entity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entities, structures first.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.structures.iter().chain(self.paths.iter())
    }

    /// Entity covering `cell`, preferring structures over paths.
    #[must_use]
    pub fn at_cell(&self, cell: Cell) -> Option<&PlacedEntity> {
        self.structures
            .at_cell(cell)
            .or_else(|| self.paths.at_cell(cell))
    }
}
