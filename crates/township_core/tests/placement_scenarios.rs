//! End-to-end placement scenarios driven through scripted input.

use township_core::prelude::*;
use township_core::tools::MoveState;
use township_test_utils::fixtures::{
    self, cells, screen, screen_at_cell, HALL, HUT, ROAD, SHED, TRAIL,
};
use township_test_utils::{FakeScene, InputScript};

struct Harness {
    controller: ToolController,
    scene: FakeScene,
    script: InputScript,
}

impl Harness {
    fn new() -> Self {
        fixtures::init_tracing();
        Self {
            controller: fixtures::controller(),
            scene: FakeScene::new(),
            script: InputScript::new(),
        }
    }

    fn with_config(config: PlacementConfig) -> Self {
        Self {
            controller: ToolController::new(config, fixtures::catalog()),
            ..Self::new()
        }
    }

    fn start(&mut self, type_index: usize) -> bool {
        self.controller.start_placing(&mut self.scene, type_index)
    }

    fn set_mode(&mut self, mode: ToolMode) -> bool {
        self.controller.set_tool_active(&mut self.scene, mode)
    }

    fn hover(&mut self, x: f32, z: f32) -> &mut Self {
        self.script
            .hover(&mut self.controller, &mut self.scene, screen(x, z));
        self
    }

    fn click_at(&mut self, x: f32, z: f32) -> &mut Self {
        self.script
            .click_at(&mut self.controller, &mut self.scene, screen(x, z));
        self
    }

    fn click_cell(&mut self, cell: Cell) -> &mut Self {
        self.script
            .click_at(&mut self.controller, &mut self.scene, screen_at_cell(cell));
        self
    }

    fn idle(&mut self, ticks: usize) -> &mut Self {
        self.script.idle(&mut self.controller, &mut self.scene, ticks);
        self
    }

    /// Place one entity interactively and return its id.
    fn place(&mut self, type_index: usize, x: f32, z: f32) -> EntityId {
        let before: Vec<EntityId> = self.controller.entities().map(|e| e.id).collect();
        assert!(self.start(type_index));
        self.click_at(x, z);
        if self.controller.mode() != ToolMode::None {
            self.script.cancel(&mut self.controller, &mut self.scene);
        }
        self.idle(4);
        self.controller
            .entities()
            .map(|e| e.id)
            .find(|id| !before.contains(id))
            .expect("placement should succeed")
    }

    fn preview_angle(&self) -> f32 {
        self.controller.preview().expect("preview").angle()
    }
}

// ============================================================================
// Simple build / destroy
// ============================================================================

#[test]
fn test_simple_build_snaps_to_cell() {
    let mut h = Harness::new();

    assert!(h.start(HUT));
    assert_eq!(h.controller.mode(), ToolMode::Build);
    h.click_at(2.3, 4.9);

    assert!(!h.controller.are_cells_free([Cell::new(2, 5)]));
    assert_eq!(h.controller.entity_count(), 1);
    assert_eq!(h.controller.mode(), ToolMode::None);

    let entity = h.controller.entities().next().unwrap();
    assert_eq!(entity.position, fixtures::ground(2.0, 5.0));
    assert_eq!(entity.footprint.to_vec(), cells(&[(2, 5)]));

    // The preview instance became the building.
    assert_eq!(h.scene.live(), 1);
    assert_eq!(h.scene.ghosts(), 0);
    assert!(h.controller.audit().is_empty());
}

#[test]
fn test_destroy_frees_cells() {
    let mut h = Harness::new();
    let id = h.place(HUT, 2.3, 4.9);

    assert!(h.controller.remove_by_id(&mut h.scene, id));
    assert!(h.controller.are_cells_free([Cell::new(2, 5)]));
    assert_eq!(h.scene.live(), 0);

    assert!(!h.controller.remove_by_id(&mut h.scene, id));
}

#[test]
fn test_unknown_type_index_is_refused() {
    let mut h = Harness::new();
    assert!(!h.start(42));
    assert_eq!(h.controller.mode(), ToolMode::None);
    assert_eq!(h.scene.live(), 0);
}

#[test]
fn test_invalid_confirm_is_ignored() {
    let mut h = Harness::new();
    h.place(HUT, 2.0, 5.0);

    assert!(h.start(HUT));
    h.click_at(2.0, 5.0);

    assert_eq!(h.controller.entity_count(), 1);
    assert_eq!(h.controller.mode(), ToolMode::Build);
    let preview = h.controller.preview().unwrap();
    assert!(!preview.is_valid());
    assert_eq!(h.scene.tint_of(preview.instance()), Some(Tint::Invalid));
}

#[test]
fn test_preview_tint_follows_validity() {
    let mut h = Harness::new();
    h.place(HUT, 3.0, 3.0);

    h.start(HUT);
    h.hover(1.0, 1.0);
    let instance = h.controller.preview().unwrap().instance();
    assert_eq!(h.scene.tint_of(instance), Some(Tint::Valid));

    h.hover(3.0, 3.0);
    assert_eq!(h.scene.tint_of(instance), Some(Tint::Invalid));
}

#[test]
fn test_ground_miss_keeps_last_position() {
    let mut h = Harness::new();
    h.start(HUT);
    h.hover(2.0, 2.0);

    h.scene.set_ground_hit(false);
    h.hover(8.0, 8.0);

    let preview = h.controller.preview().unwrap();
    assert_eq!(preview.position(), fixtures::ground(2.0, 2.0));
    assert!(preview.is_valid());
}

#[test]
fn test_preview_is_invalid_until_ground_is_hit() {
    let mut h = Harness::new();
    h.scene.set_ground_hit(false);
    h.start(HUT);
    h.click_at(1.0, 1.0);

    assert_eq!(h.controller.entity_count(), 0);
    assert_eq!(h.controller.mode(), ToolMode::Build);
}

#[test]
fn test_ground_height_is_kept() {
    let mut h = Harness::new();
    h.scene.set_ground_height(1.5);
    h.start(HUT);
    h.click_at(4.2, 0.8);

    let entity = h.controller.entities().next().unwrap();
    assert_eq!(entity.position, glam::Vec3::new(4.0, 1.5, 1.0));
}

// ============================================================================
// Build tool confirm policy
// ============================================================================

#[test]
fn test_modifier_repeats_placement() {
    let mut h = Harness::new();
    h.start(HUT);

    h.script.set_modifier(true);
    h.click_at(0.0, 0.0).idle(2);
    assert_eq!(h.controller.mode(), ToolMode::Build);
    assert!(h.controller.preview().is_some());

    h.click_at(2.0, 0.0).idle(2);
    assert_eq!(h.controller.mode(), ToolMode::Build);

    h.script.set_modifier(false);
    h.click_at(4.0, 0.0);

    assert_eq!(h.controller.entity_count(), 3);
    assert_eq!(h.controller.mode(), ToolMode::None);
    assert_eq!(h.scene.ghosts(), 0);
}

#[test]
fn test_escape_cancels_build() {
    let mut h = Harness::new();
    h.start(HALL);
    h.hover(1.0, 1.0);
    h.script.cancel(&mut h.controller, &mut h.scene);

    assert_eq!(h.controller.mode(), ToolMode::None);
    assert_eq!(h.scene.live(), 0);
    assert_eq!(h.controller.ledger(), &OccupancyLedger::new());
}

#[test]
fn test_right_click_cancels_but_right_drag_does_not() {
    let mut h = Harness::new();
    h.start(HUT);
    h.hover(1.0, 1.0);

    h.script
        .right_hold(&mut h.controller, &mut h.scene, 0.6);
    assert_eq!(h.controller.mode(), ToolMode::Build);

    h.script.right_click(&mut h.controller, &mut h.scene);
    assert_eq!(h.controller.mode(), ToolMode::None);
    assert_eq!(h.scene.live(), 0);
}

// ============================================================================
// Rotation
// ============================================================================

#[test]
fn test_full_turn_of_coarse_taps_returns_to_start() {
    let mut h = Harness::new();
    h.start(HUT);
    h.hover(0.0, 0.0);
    let start = h.preview_angle();

    for _ in 0..24 {
        h.script.tap_rotate(&mut h.controller, &mut h.scene);
    }

    assert_eq!(h.preview_angle(), start);
}

#[test]
fn test_four_quarter_taps_return_to_start() {
    let config = PlacementConfig {
        building_coarse_step_degrees: 90.0,
        ..fixtures::config()
    };
    let mut h = Harness::with_config(config);
    h.start(SHED);
    h.hover(0.0, 0.0);

    let mut seen = Vec::new();
    for _ in 0..4 {
        h.script.tap_rotate(&mut h.controller, &mut h.scene);
        seen.push(h.preview_angle());
    }

    assert_eq!(seen, vec![90.0, 180.0, 270.0, 0.0]);
}

#[test]
fn test_fine_then_coarse_rotation() {
    let mut h = Harness::new();
    h.start(HUT);
    h.hover(0.0, 0.0);

    h.script
        .hold_rotate(&mut h.controller, &mut h.scene, 1.0);
    let drifted = h.preview_angle();
    assert!(drifted > 7.5 && drifted < 22.5, "drifted to {drifted}");
    assert!(h.controller.preview().unwrap().rotation().ever_used_fine());

    h.script.tap_rotate(&mut h.controller, &mut h.scene);
    assert_eq!(h.preview_angle(), 30.0);
}

#[test]
fn test_rotation_resets_on_new_preview() {
    let mut h = Harness::new();
    h.start(HUT);
    h.hover(0.0, 0.0);
    h.script.tap_rotate(&mut h.controller, &mut h.scene);
    assert_eq!(h.preview_angle(), 15.0);

    h.start(HUT);
    assert_eq!(h.preview_angle(), 0.0);
}

#[test]
fn test_rotated_shed_covers_rotated_cells() {
    let config = PlacementConfig {
        building_coarse_step_degrees: 90.0,
        ..fixtures::config()
    };
    let mut h = Harness::with_config(config);
    h.start(SHED);
    h.hover(3.0, 3.0);
    h.script.tap_rotate(&mut h.controller, &mut h.scene);
    h.click_at(3.0, 3.0);

    // A quarter turn about the pivot swings the long side from +Z to +X.
    let entity = h.controller.entities().next().unwrap();
    assert_eq!(entity.footprint.to_vec(), cells(&[(3, 2), (4, 2)]));
    assert_eq!(entity.angle, 90.0);
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn test_path_painting_keeps_tool_active() {
    let mut h = Harness::new();
    h.start(TRAIL);

    let mut ids = Vec::new();
    for x in [1.0, 2.0, 3.0] {
        h.click_at(x, 0.0).idle(4);
        assert_eq!(h.controller.mode(), ToolMode::Path);
        assert!(h.controller.preview().is_some());
        ids = h.controller.entities().map(|e| e.id).collect::<Vec<_>>();
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert_eq!(h.scene.ghosts(), 1);
}

#[test]
fn test_path_drag_paints_each_cell_once() {
    let mut h = Harness::new();
    h.start(ROAD);

    let mut walk = Vec::new();
    for x in 0..5 {
        for _ in 0..4 {
            walk.push(screen(x as f32, 0.0));
        }
    }
    h.script
        .drag_primary(&mut h.controller, &mut h.scene, &walk);

    assert_eq!(h.controller.entity_count(), 5);
    for x in 0..5 {
        assert_eq!(h.controller.cell_speed_modifier(Cell::new(x, 0)), 1.0);
    }
    assert!(h.controller.audit().is_empty());
}

#[test]
fn test_path_right_click_drops_preview_only() {
    let mut h = Harness::new();
    h.start(TRAIL);
    h.hover(1.0, 1.0);

    h.script.right_click(&mut h.controller, &mut h.scene);
    assert_eq!(h.controller.mode(), ToolMode::Path);
    assert!(h.controller.preview().is_none());
    assert_eq!(h.scene.ghosts(), 0);

    // Next press brings the preview back without placing.
    h.click_at(1.0, 1.0);
    assert!(h.controller.preview().is_some());
    assert_eq!(h.controller.entity_count(), 0);

    h.script.cancel(&mut h.controller, &mut h.scene);
    assert_eq!(h.controller.mode(), ToolMode::None);
}

#[test]
fn test_paths_and_buildings_share_cells() {
    let mut h = Harness::new();
    h.place(HUT, 2.0, 2.0);
    h.place(TRAIL, 2.0, 2.0);

    assert_eq!(h.controller.entity_count(), 2);
    assert!(!h.controller.are_cells_free([Cell::new(2, 2)]));
    assert!(!h
        .controller
        .are_cells_free_in(OccupancyLayer::Paths, [Cell::new(2, 2)]));
}

// ============================================================================
// Speed modifiers
// ============================================================================

#[test]
fn test_speed_modifiers_and_entrance() {
    let mut h = Harness::new();
    h.place(TRAIL, 6.0, 6.0);
    h.place(HALL, 0.0, 0.0);

    assert_eq!(h.controller.cell_speed_modifier(Cell::new(6, 6)), 0.5);
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(0, 0)), 0.0);
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(1, 1)), -1.0);
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(9, 9)), 0.0);
}

#[test]
fn test_path_speed_survives_building_removal() {
    let mut h = Harness::new();
    h.place(TRAIL, 2.0, 5.0);
    let hut = h.place(HUT, 2.0, 5.0);
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(2, 5)), 0.0);

    assert!(h.controller.remove_by_id(&mut h.scene, hut));

    assert!(!h
        .controller
        .are_cells_free_in(OccupancyLayer::Paths, [Cell::new(2, 5)]));
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(2, 5)), 0.5);
}

#[test]
fn test_moving_building_off_path_restores_path_speed() {
    let mut h = Harness::new();
    h.place(ROAD, 4.0, 4.0);
    let hut = h.place(HUT, 4.0, 4.0);

    h.set_mode(ToolMode::Move);
    h.click_cell(Cell::new(4, 4));
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(4, 4)), 1.0);

    h.click_at(8.0, 8.0);

    assert_eq!(h.controller.entity(hut).unwrap().footprint.to_vec(), cells(&[(8, 8)]));
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(4, 4)), 1.0);
    assert!(h.controller.audit().is_empty());
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let mut h = Harness::with_config(PlacementConfig {
        cell_size: 0.0,
        ..PlacementConfig::default()
    });

    assert_eq!(h.controller.config(), &PlacementConfig::default());
    h.place(HUT, 2.0, 2.0);
    assert!(!h.controller.are_cells_free([Cell::new(2, 2)]));
}

#[test]
fn test_nearest_grid_point() {
    let h = Harness::new();
    let snapped = h
        .controller
        .nearest_grid_point(glam::Vec3::new(2.4, 1.7, -0.6));
    assert_eq!(snapped, glam::Vec3::new(2.0, 1.7, -1.0));
}

// ============================================================================
// Move tool
// ============================================================================

#[test]
fn test_move_rollback_restores_everything() {
    let mut h = Harness::new();
    let shed = h.place(SHED, 0.0, 0.0);
    h.place(HUT, 5.0, 5.0);

    let ledger_before = h.controller.ledger().clone();
    let entity_before = h.controller.entity(shed).unwrap().clone();
    let instance = entity_before.instance.unwrap();

    assert!(h.set_mode(ToolMode::Move));
    h.click_cell(Cell::new(0, 0));
    assert_eq!(h.controller.move_state(), MoveState::Dragging);
    assert!(h.controller.are_cells_free(cells(&[(0, 0), (0, 1)])));

    // Destination overlaps the hut: confirm refused.
    h.click_at(5.2, 5.2);
    assert_eq!(h.controller.move_state(), MoveState::Dragging);
    assert!(!h.controller.preview().unwrap().is_valid());

    h.script.right_click(&mut h.controller, &mut h.scene);

    assert_eq!(h.controller.mode(), ToolMode::None);
    assert_eq!(h.controller.move_state(), MoveState::Idle);
    assert_eq!(h.controller.ledger(), &ledger_before);
    assert_eq!(h.controller.entity(shed), Some(&entity_before));
    assert_eq!(h.scene.instances[&instance].position, entity_before.position);
    assert_eq!(h.scene.instances[&instance].tint, None);
    assert!(h.controller.audit().is_empty());
}

#[test]
fn test_move_commit_frees_old_cells() {
    let mut h = Harness::new();
    let shed = h.place(SHED, 0.0, 0.0);
    assert_eq!(
        h.controller.entity(shed).unwrap().footprint.to_vec(),
        cells(&[(0, 0), (0, 1)])
    );

    h.set_mode(ToolMode::Move);
    h.click_cell(Cell::new(0, 1));
    h.click_at(5.2, 5.2);

    assert!(h.controller.are_cells_free(cells(&[(0, 0), (0, 1)])));
    assert!(!h.controller.are_cells_free([Cell::new(5, 5)]));
    assert!(!h.controller.are_cells_free([Cell::new(5, 6)]));

    for cell in cells(&[(0, 0), (0, 1)]) {
        assert!(h.controller.entity_at_cell(cell).is_none());
    }
    for cell in cells(&[(5, 5), (5, 6)]) {
        assert_eq!(h.controller.entity_at_cell(cell).map(|e| e.id), Some(shed));
    }

    assert_eq!(h.controller.mode(), ToolMode::None);
    assert_eq!(h.controller.entity_count(), 1);
    assert!(h.controller.audit().is_empty());
}

#[test]
fn test_move_keeps_id_and_entrance() {
    let mut h = Harness::new();
    let hall = h.place(HALL, 0.0, 0.0);

    h.set_mode(ToolMode::Move);
    h.click_cell(Cell::new(1, 1));
    h.click_at(6.0, 6.0);

    let moved = h.controller.entity(hall).unwrap();
    assert_eq!(moved.position, fixtures::ground(6.0, 6.0));
    assert_eq!(moved.entrance, Some(Cell::new(6, 6)));
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(6, 6)), 0.0);
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(7, 7)), -1.0);
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(1, 1)), 0.0);
}

#[test]
fn test_move_with_modifier_chains() {
    let mut h = Harness::new();
    let a = h.place(HUT, 0.0, 0.0);
    let b = h.place(HUT, 1.0, 0.0);

    h.set_mode(ToolMode::Move);
    h.script.set_modifier(true);
    h.click_cell(Cell::new(0, 0));
    h.click_at(0.0, 4.0);
    assert_eq!(h.controller.mode(), ToolMode::Move);
    assert_eq!(h.controller.move_state(), MoveState::Selecting);

    h.script.set_modifier(false);
    h.click_cell(Cell::new(1, 0));
    h.click_at(1.0, 4.0);

    assert_eq!(h.controller.mode(), ToolMode::None);
    assert_eq!(h.controller.entity(a).unwrap().footprint.to_vec(), cells(&[(0, 4)]));
    assert_eq!(h.controller.entity(b).unwrap().footprint.to_vec(), cells(&[(1, 4)]));
}

#[test]
fn test_switching_tool_rolls_back_move() {
    let mut h = Harness::new();
    let shed = h.place(SHED, 0.0, 0.0);
    let ledger_before = h.controller.ledger().clone();

    h.set_mode(ToolMode::Move);
    h.click_cell(Cell::new(0, 0));
    h.hover(8.0, 8.0);
    assert!(h.controller.preview().unwrap().is_valid());

    assert!(h.set_mode(ToolMode::Destroy));

    assert_eq!(h.controller.mode(), ToolMode::Destroy);
    assert_eq!(h.controller.ledger(), &ledger_before);
    assert_eq!(
        h.controller.entity(shed).unwrap().position,
        fixtures::ground(0.0, 0.0)
    );
}

#[test]
fn test_move_click_on_empty_ground_does_nothing() {
    let mut h = Harness::new();
    h.place(HUT, 0.0, 0.0);

    h.set_mode(ToolMode::Move);
    h.click_cell(Cell::new(7, 7));

    assert_eq!(h.controller.move_state(), MoveState::Selecting);
    assert_eq!(h.controller.mode(), ToolMode::Move);
}

// ============================================================================
// Destroy tool
// ============================================================================

#[test]
fn test_destroy_highlights_and_removes() {
    let mut h = Harness::new();
    let hut = h.place(HUT, 1.0, 1.0);
    h.place(TRAIL, 1.0, 1.0);
    let trail = h.place(TRAIL, 3.0, 3.0);
    let hut_instance = h.controller.entity(hut).unwrap().instance.unwrap();

    h.set_mode(ToolMode::Destroy);
    h.script
        .hover(&mut h.controller, &mut h.scene, screen_at_cell(Cell::new(1, 1)));
    assert_eq!(h.controller.highlighted(), Some(hut));
    assert_eq!(h.scene.tint_of(hut_instance), Some(Tint::Highlight));

    h.script
        .hover(&mut h.controller, &mut h.scene, screen_at_cell(Cell::new(3, 3)));
    assert_eq!(h.controller.highlighted(), Some(trail));
    assert_eq!(h.scene.tint_of(hut_instance), None);

    h.click_cell(Cell::new(3, 3));

    assert!(h.controller.entity(trail).is_none());
    assert!(h
        .controller
        .are_cells_free_in(OccupancyLayer::Paths, [Cell::new(3, 3)]));
    assert_eq!(h.controller.cell_speed_modifier(Cell::new(3, 3)), 0.0);
    assert_eq!(h.controller.mode(), ToolMode::Destroy);
    assert_eq!(h.controller.entity_count(), 2);

    h.script
        .hover(&mut h.controller, &mut h.scene, screen_at_cell(Cell::new(8, 8)));
    assert_eq!(h.controller.highlighted(), None);
}

// ============================================================================
// Exclusivity and events
// ============================================================================

#[test]
fn test_switching_tools_leaves_one_preview() {
    let mut h = Harness::new();
    h.start(HUT);
    h.hover(1.0, 1.0);
    assert_eq!(h.scene.ghosts(), 1);

    assert!(h.set_mode(ToolMode::Path));
    assert_eq!(h.controller.mode(), ToolMode::Path);
    assert_eq!(h.scene.ghosts(), 1);
    assert_eq!(h.controller.preview().unwrap().type_index(), TRAIL);

    assert!(h.set_mode(ToolMode::None));
    assert_eq!(h.scene.live(), 0);
    assert_eq!(h.controller.ledger(), &OccupancyLedger::new());
}

#[test]
fn test_events_record_session() {
    let mut h = Harness::new();
    let id = h.place(HUT, 0.0, 0.0);
    h.controller.remove_by_id(&mut h.scene, id);

    let events = h.controller.drain_events();
    assert_eq!(
        events,
        vec![
            PlacementEvent::ToolChanged {
                from: ToolMode::None,
                to: ToolMode::Build
            },
            PlacementEvent::Placed {
                id,
                type_index: HUT,
                kind: EntityKind::Structure
            },
            PlacementEvent::ToolChanged {
                from: ToolMode::Build,
                to: ToolMode::None
            },
            PlacementEvent::Removed {
                id,
                kind: EntityKind::Structure
            },
        ]
    );
    assert!(h.controller.drain_events().is_empty());
}

#[test]
fn test_clear_removes_everything() {
    let mut h = Harness::new();
    h.place(HALL, 0.0, 0.0);
    h.place(ROAD, 4.0, 4.0);
    h.start(HUT);

    h.controller.clear(&mut h.scene);

    assert_eq!(h.controller.entity_count(), 0);
    assert_eq!(h.controller.mode(), ToolMode::None);
    assert_eq!(h.controller.ledger(), &OccupancyLedger::new());
    assert_eq!(h.scene.live(), 0);
}
