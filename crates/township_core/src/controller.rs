//! Tool exclusivity and the public placement surface.
//!
//! [`ToolController`] owns the shared [`PlacementWorld`] and one instance of
//! every tool. It guarantees that at most one tool is active and that the
//! outgoing tool has cleaned up (preview destroyed, move rolled back)
//! before the incoming one starts.

use glam::{Vec2, Vec3};

use crate::catalog::{Catalog, PrefabKind};
use crate::config::PlacementConfig;
use crate::entity::{EntityId, EntityKind, PlacedEntity};
use crate::error::{PlacementError, Result};
use crate::events::PlacementEvent;
use crate::grid::{Cell, GridCoordinateSystem};
use crate::input::TickInput;
use crate::ledger::{OccupancyLayer, OccupancyLedger};
use crate::placement::{Placement, PlacementWorld};
use crate::preview::PlacementPreview;
use crate::save::{LoadReport, SaveGame, SAVE_VERSION};
use crate::scene::Scene;
use crate::tools::{
    BuildTool, DestroyTool, MoveState, MoveTool, PathTool, Tool, ToolMode, ToolSignal,
};

/// Single owner of the active tool slot.
#[derive(Debug, Clone)]
pub struct ToolController {
    world: PlacementWorld,
    mode: ToolMode,
    build: BuildTool,
    path: PathTool,
    relocate: MoveTool,
    destroy: DestroyTool,
    cursor: Option<Vec2>,
}

impl Default for ToolController {
    fn default() -> Self {
        Self::new(PlacementConfig::default(), Catalog::starter())
    }
}

impl ToolController {
    /// Create a controller with an empty world.
    ///
    /// A config that fails [`PlacementConfig::validate`] is replaced by the
    /// defaults with a warning.
    #[must_use]
    pub fn new(config: PlacementConfig, catalog: Catalog) -> Self {
        let problems = config.validate();
        let config = if problems.is_empty() {
            config
        } else {
            tracing::warn!(
                "Invalid placement config ({}), using defaults",
                problems.join("; ")
            );
            PlacementConfig::default()
        };

        let world = PlacementWorld::new(config, catalog);
        Self {
            build: BuildTool::new(&world),
            path: PathTool::new(&world),
            relocate: MoveTool::new(&world),
            destroy: DestroyTool::new(&world),
            world,
            mode: ToolMode::None,
            cursor: None,
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Active tool.
    #[must_use]
    pub const fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Shared placement state.
    #[must_use]
    pub const fn world(&self) -> &PlacementWorld {
        &self.world
    }

    /// Placement tunables.
    #[must_use]
    pub const fn config(&self) -> &PlacementConfig {
        &self.world.config
    }

    /// Prefab catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.world.catalog
    }

    /// World/cell conversion.
    #[must_use]
    pub const fn grid(&self) -> &GridCoordinateSystem {
        &self.world.grid
    }

    /// Occupancy ledger.
    #[must_use]
    pub const fn ledger(&self) -> &OccupancyLedger {
        &self.world.ledger
    }

    /// Preview of the active tool, if it has one.
    #[must_use]
    pub fn preview(&self) -> Option<&PlacementPreview> {
        match self.mode {
            ToolMode::None => None,
            ToolMode::Build => self.build.preview(),
            ToolMode::Path => self.path.preview(),
            ToolMode::Destroy => self.destroy.preview(),
            ToolMode::Move => self.relocate.preview(),
        }
    }

    /// Move tool state.
    #[must_use]
    pub const fn move_state(&self) -> MoveState {
        self.relocate.state()
    }

    /// Entity highlighted by the destroy tool.
    #[must_use]
    pub fn highlighted(&self) -> Option<EntityId> {
        self.destroy.highlighted()
    }

    // ========================================================================
    // Tool slot
    // ========================================================================

    /// Start placing catalog entry `type_index` with the tool matching its
    /// kind. An already running preview is replaced.
    ///
    /// Returns `false` (and changes nothing) for an unknown index.
    pub fn start_placing(&mut self, scene: &mut dyn Scene, type_index: usize) -> bool {
        let Some(prefab) = self.world.catalog.get(type_index) else {
            tracing::warn!("start_placing: type index {} is not in the catalog", type_index);
            return false;
        };

        let mode = match prefab.kind {
            PrefabKind::Building => {
                self.build.select(&self.world, type_index);
                ToolMode::Build
            }
            PrefabKind::Path => {
                self.path.select(&self.world, type_index);
                ToolMode::Path
            }
        };

        self.switch(scene, mode)
    }

    /// Make `mode` the active tool. Selecting the active mode again is a
    /// no-op. Build and path activation reuse the last selected type, or the
    /// first catalog entry of that kind.
    ///
    /// Returns whether `mode` is active afterwards.
    pub fn set_tool_active(&mut self, scene: &mut dyn Scene, mode: ToolMode) -> bool {
        if mode == self.mode {
            return true;
        }

        match mode {
            ToolMode::Build if self.build.selected().is_none() => {
                if let Some(index) = self.world.catalog.first_of_kind(PrefabKind::Building) {
                    self.build.select(&self.world, index);
                }
            }
            ToolMode::Path if self.path.selected().is_none() => {
                if let Some(index) = self.world.catalog.first_of_kind(PrefabKind::Path) {
                    self.path.select(&self.world, index);
                }
            }
            _ => {}
        }

        self.switch(scene, mode)
    }

    fn split(&mut self, mode: ToolMode) -> (Option<&mut dyn Tool>, &mut PlacementWorld) {
        let tool: Option<&mut dyn Tool> = match mode {
            ToolMode::None => None,
            ToolMode::Build => Some(&mut self.build),
            ToolMode::Path => Some(&mut self.path),
            ToolMode::Destroy => Some(&mut self.destroy),
            ToolMode::Move => Some(&mut self.relocate),
        };
        (tool, &mut self.world)
    }

    fn switch(&mut self, scene: &mut dyn Scene, to: ToolMode) -> bool {
        let from = self.mode;

        if let (Some(tool), world) = self.split(from) {
            tool.deactivate(world, scene);
        }
        self.mode = ToolMode::None;

        let cursor = self.cursor;
        let activated = match self.split(to) {
            (Some(tool), world) => tool.activate(world, scene, cursor),
            (None, _) => true,
        };
        if activated {
            self.mode = to;
        } else {
            tracing::debug!("Tool {} has nothing to do, staying inactive", to);
        }

        if self.mode != from {
            tracing::info!("Tool changed: {} -> {}", from, self.mode);
            self.world.events.push(PlacementEvent::ToolChanged {
                from,
                to: self.mode,
            });
        }

        activated
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Drive the active tool for one tick.
    pub fn tick(&mut self, scene: &mut dyn Scene, input: &TickInput) {
        self.cursor = input.cursor;

        let mode = self.mode;
        let signal = match self.split(mode) {
            (Some(tool), world) => tool.tick(world, scene, input),
            (None, _) => return,
        };

        match signal {
            ToolSignal::Continue => {}
            ToolSignal::Exit => {
                self.switch(scene, ToolMode::None);
            }
            ToolSignal::Remove(id) => {
                self.remove_by_id(scene, id);
            }
        }
    }

    /// Take every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<PlacementEvent> {
        std::mem::take(&mut self.world.events)
    }

    // ========================================================================
    // Queries and removal
    // ========================================================================

    /// Remove a placed entity through the tool that owns it.
    ///
    /// Returns `false` for an unknown id (including an entity currently
    /// being carried by the move tool).
    pub fn remove_by_id(&mut self, scene: &mut dyn Scene, id: EntityId) -> bool {
        match self.world.entities.kind_of(id) {
            Some(EntityKind::Structure) => self.build.remove_by_id(&mut self.world, scene, id),
            Some(EntityKind::Path) => self.path.remove_by_id(&mut self.world, scene, id),
            None => {
                tracing::warn!("remove_by_id: unknown entity {}", id);
                false
            }
        }
    }

    /// True iff no building occupies any of `cells`.
    pub fn are_cells_free(&self, cells: impl IntoIterator<Item = Cell>) -> bool {
        self.world.ledger.are_free(OccupancyLayer::Structures, cells)
    }

    /// True iff nothing in `layer` occupies any of `cells`.
    pub fn are_cells_free_in(
        &self,
        layer: OccupancyLayer,
        cells: impl IntoIterator<Item = Cell>,
    ) -> bool {
        self.world.ledger.are_free(layer, cells)
    }

    /// Speed modifier of a cell (0 when unset).
    #[must_use]
    pub fn cell_speed_modifier(&self, cell: Cell) -> f32 {
        self.world.ledger.speed_modifier(cell)
    }

    /// `position` snapped to the nearest grid point.
    #[must_use]
    pub fn nearest_grid_point(&self, position: Vec3) -> Vec3 {
        self.world.grid.snap_to_grid(position)
    }

    /// A placed entity by id.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&PlacedEntity> {
        self.world.entities.get(id)
    }

    /// Entity covering `cell`, buildings before paths.
    #[must_use]
    pub fn entity_at_cell(&self, cell: Cell) -> Option<&PlacedEntity> {
        self.world.entities.at_cell(cell)
    }

    /// Every placed entity.
    pub fn entities(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.world.entities.iter()
    }

    /// Number of placed entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.world.entities.len()
    }

    /// Occupancy invariant violations; empty when consistent.
    #[must_use]
    pub fn audit(&self) -> Vec<String> {
        self.world.audit()
    }

    /// Deactivate the current tool and remove every entity.
    pub fn clear(&mut self, scene: &mut dyn Scene) {
        self.switch(scene, ToolMode::None);

        let ids: Vec<EntityId> = self.world.entities.iter().map(|entity| entity.id).collect();
        for id in ids {
            self.remove_by_id(scene, id);
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Snapshot every placed entity. An entity being carried by the move
    /// tool is saved where it was picked up.
    #[must_use]
    pub fn save(&self) -> SaveGame {
        SaveGame::from_entities(self.world.entities.iter().chain(self.relocate.carried()))
    }

    /// Replace the world with the contents of a save.
    ///
    /// Every record goes through the same confirm path as an interactive
    /// placement. Records that no longer fit are skipped and reported.
    ///
    /// # Errors
    /// Returns an error if the save was written by another format version.
    pub fn load(&mut self, scene: &mut dyn Scene, save: &SaveGame) -> Result<LoadReport> {
        if save.version != SAVE_VERSION {
            return Err(PlacementError::SaveVersionMismatch {
                expected: SAVE_VERSION,
                found: save.version,
            });
        }

        self.clear(scene);
        let mut report = LoadReport::default();

        for record in &save.entities {
            let prefab = match self.world.catalog.require(record.type_index) {
                Ok(prefab) => prefab,
                Err(e) => {
                    tracing::warn!("Skipping saved entity {}: {}", record.id, e);
                    report.skipped.push(format!("{}: {e}", record.id));
                    continue;
                }
            };

            let rotation = PlacementWorld::orientation(prefab, record.angle);
            let instance = scene.spawn_instance(record.type_index, record.position, rotation, false);
            let placement = Placement {
                id: Some(record.id),
                type_index: record.type_index,
                position: record.position,
                angle: record.angle,
                instance: Some(instance),
                speed_modifier: Some(record.speed_modifier),
            };

            match self.world.confirm(placement) {
                Some(id) => {
                    report.loaded += 1;
                    let stored = self.world.entities.get(id).map(|entity| entity.footprint.to_vec());
                    if stored.as_deref() != Some(record.footprint.as_slice()) {
                        tracing::debug!("Saved entity {} rebuilt with a different footprint", id);
                    }
                }
                None => {
                    scene.despawn(instance);
                    tracing::warn!("Skipping saved entity {}: cells unavailable", record.id);
                    report
                        .skipped
                        .push(format!("{}: cells unavailable", record.id));
                }
            }
        }

        tracing::info!(
            "Loaded {} entities ({} skipped)",
            report.loaded,
            report.skipped.len()
        );

        Ok(report)
    }
}
