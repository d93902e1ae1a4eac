//! Test fixtures and helpers.
//!
//! A small catalog with one prefab per footprint shape the tests need,
//! plus ready-made controllers.

use glam::{Vec2, Vec3};
use township_core::catalog::{Catalog, PrefabDef, PrefabKind};
use township_core::config::PlacementConfig;
use township_core::controller::ToolController;
use township_core::grid::Cell;

/// 1x1 building.
pub const HUT: usize = 0;
/// 1x2 building (one cell along X, two along Z).
pub const SHED: usize = 1;
/// 2x2 building with a slowing footprint and an entrance at its pivot cell.
pub const HALL: usize = 2;
/// Path tile with a 0.5 speed bonus.
pub const TRAIL: usize = 3;
/// Path tile with a 1.0 speed bonus.
pub const ROAD: usize = 4;

/// The fixture catalog.
#[must_use]
pub fn catalog() -> Catalog {
    Catalog::new(vec![
        PrefabDef::new("hut", PrefabKind::Building, Vec2::new(1.0, 1.0)),
        PrefabDef::new("shed", PrefabKind::Building, Vec2::new(1.0, 2.0)),
        PrefabDef::new("hall", PrefabKind::Building, Vec2::new(2.0, 2.0))
            .with_speed_modifier(-1.0)
            .with_entrance(Vec2::new(0.5, 0.5)),
        PrefabDef::new("trail", PrefabKind::Path, Vec2::ONE).with_speed_modifier(0.5),
        PrefabDef::new("road", PrefabKind::Path, Vec2::ONE).with_speed_modifier(1.0),
    ])
}

/// Default tuning: unit cells at the origin.
#[must_use]
pub fn config() -> PlacementConfig {
    PlacementConfig::default()
}

/// Controller over the fixture catalog with default tuning.
#[must_use]
pub fn controller() -> ToolController {
    ToolController::new(config(), catalog())
}

/// Screen position the fake scene projects onto world `(x, 0, z)`.
#[must_use]
pub fn screen(x: f32, z: f32) -> Vec2 {
    Vec2::new(x, z)
}

/// Screen position over the centre of `cell`.
#[must_use]
pub fn screen_at_cell(cell: Cell) -> Vec2 {
    Vec2::new(cell.x as f32 + 0.5, cell.z as f32 + 0.5)
}

/// World point on the ground plane.
#[must_use]
pub fn ground(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, 0.0, z)
}

/// Shorthand for a list of cells.
#[must_use]
pub fn cells(coords: &[(i32, i32)]) -> Vec<Cell> {
    coords.iter().map(|&coord| Cell::from(coord)).collect()
}

/// Route `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
