//! Save and load through the controller.

use township_core::prelude::*;
use township_core::save::{PlacedRecord, SAVE_VERSION};
use township_test_utils::fixtures::{self, cells, screen, HALL, HUT, SHED, TRAIL};
use township_test_utils::{FakeScene, InputScript};

struct Harness {
    controller: ToolController,
    scene: FakeScene,
    script: InputScript,
}

impl Harness {
    fn new() -> Self {
        Self {
            controller: fixtures::controller(),
            scene: FakeScene::new(),
            script: InputScript::new(),
        }
    }

    fn place(&mut self, type_index: usize, x: f32, z: f32) -> EntityId {
        let before: Vec<EntityId> = self.controller.entities().map(|e| e.id).collect();
        assert!(self.controller.start_placing(&mut self.scene, type_index));
        self.script
            .click_at(&mut self.controller, &mut self.scene, screen(x, z));
        if self.controller.mode() != ToolMode::None {
            self.script.cancel(&mut self.controller, &mut self.scene);
        }
        self.script.idle(&mut self.controller, &mut self.scene, 4);
        self.controller
            .entities()
            .map(|e| e.id)
            .find(|id| !before.contains(id))
            .expect("placement should have succeeded")
    }

    fn populate(&mut self) -> Vec<EntityId> {
        vec![
            self.place(HUT, 0.0, 0.0),
            self.place(HALL, 3.0, 3.0),
            self.place(SHED, -4.0, 2.0),
            self.place(TRAIL, 0.0, 0.0),
            self.place(TRAIL, 1.0, 0.0),
        ]
    }
}

#[test]
fn test_ron_round_trip_rebuilds_same_world() {
    let mut h = Harness::new();
    let ids = h.populate();
    let text = h.controller.save().to_ron_string().unwrap();

    let mut restored = Harness::new();
    let save = SaveGame::from_ron_str(&text).unwrap();
    let report = restored.controller.load(&mut restored.scene, &save).unwrap();

    assert_eq!(report.loaded, ids.len());
    assert!(report.skipped.is_empty());
    assert_eq!(restored.controller.ledger(), h.controller.ledger());
    assert!(restored.controller.audit().is_empty());
    for id in ids {
        let before = h.controller.entity(id).unwrap();
        let after = restored.controller.entity(id).unwrap();
        assert_eq!(after.type_index, before.type_index);
        assert_eq!(after.position, before.position);
        assert_eq!(after.footprint, before.footprint);
        assert_eq!(after.entrance, before.entrance);
    }
    assert_eq!(restored.scene.live(), 5);
    assert_eq!(restored.scene.ghosts(), 0);
}

#[test]
fn test_file_round_trip_in_both_formats() {
    let mut h = Harness::new();
    h.populate();
    let save = h.controller.save();
    let dir = tempfile::tempdir().unwrap();

    for name in ["town.ron", "town.bin"] {
        let path = dir.path().join(name);
        save.save(&path).unwrap();
        assert_eq!(SaveGame::load(&path).unwrap(), save);
    }
}

#[test]
fn test_load_replaces_existing_world() {
    let mut h = Harness::new();
    h.place(HUT, 0.0, 0.0);
    let save = h.controller.save();

    let mut other = Harness::new();
    other.place(HALL, 5.0, 5.0);
    other.place(TRAIL, 8.0, 8.0);
    other.controller.load(&mut other.scene, &save).unwrap();

    assert_eq!(other.controller.entity_count(), 1);
    assert_eq!(other.scene.live(), 1);
    assert!(other.controller.are_cells_free(cells(&[(5, 5), (6, 6)])));
    assert_eq!(other.controller.cell_speed_modifier(Cell::new(8, 8)), 0.0);
}

#[test]
fn test_overlapping_record_is_skipped() {
    let mut h = Harness::new();
    h.place(HUT, 0.0, 0.0);
    let mut save = h.controller.save();

    let mut clash: PlacedRecord = save.entities[0].clone();
    clash.id = EntityId::generate();
    save.entities.push(clash);

    let mut restored = Harness::new();
    let report = restored.controller.load(&mut restored.scene, &save).unwrap();

    assert_eq!(report.loaded, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(restored.controller.entity_count(), 1);
    assert_eq!(restored.scene.live(), 1);
    assert!(restored.controller.audit().is_empty());
}

#[test]
fn test_unknown_type_record_is_skipped() {
    let mut h = Harness::new();
    h.place(HUT, 0.0, 0.0);
    let mut save = h.controller.save();
    save.entities[0].type_index = 42;

    let mut restored = Harness::new();
    let report = restored.controller.load(&mut restored.scene, &save).unwrap();

    assert_eq!(report.loaded, 0);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].contains("Unknown prefab type index: 42"));
    assert_eq!(restored.scene.live(), 0);
}

#[test]
fn test_version_mismatch_leaves_world_alone() {
    let mut h = Harness::new();
    h.place(HUT, 0.0, 0.0);
    let ledger = h.controller.ledger().clone();

    let save = SaveGame {
        version: SAVE_VERSION + 1,
        entities: Vec::new(),
    };
    let err = h.controller.load(&mut h.scene, &save).unwrap_err();

    assert!(matches!(
        err,
        PlacementError::SaveVersionMismatch { found, .. } if found == SAVE_VERSION + 1
    ));
    assert_eq!(h.controller.entity_count(), 1);
    assert_eq!(h.controller.ledger(), &ledger);
}

#[test]
fn test_save_during_move_keeps_carried_entity() {
    let mut h = Harness::new();
    let id = h.place(HUT, 0.0, 0.0);
    let original = h.controller.entity(id).unwrap().position;

    h.controller.set_tool_active(&mut h.scene, ToolMode::Move);
    h.script
        .click_at(&mut h.controller, &mut h.scene, screen(0.5, 0.5));
    h.script
        .hover(&mut h.controller, &mut h.scene, screen(6.0, 6.0));
    assert!(h.controller.entity(id).is_none());

    let save = h.controller.save();
    assert_eq!(save.len(), 1);
    assert_eq!(save.entities[0].id, id);
    assert_eq!(save.entities[0].position, original);
}

#[test]
fn test_saved_speed_modifier_survives_load() {
    let mut h = Harness::new();
    let trail = h.place(TRAIL, 2.0, 5.0);
    let mut save = h.controller.save();
    save.entities[0].speed_modifier = 7.5;

    let mut restored = Harness::new();
    let report = restored.controller.load(&mut restored.scene, &save).unwrap();

    assert_eq!(report.loaded, 1);
    assert_eq!(restored.controller.cell_speed_modifier(Cell::new(2, 5)), 7.5);
    assert_eq!(restored.controller.entity(trail).unwrap().speed_modifier, 7.5);
    assert_eq!(restored.controller.save().entities[0].speed_modifier, 7.5);
}
