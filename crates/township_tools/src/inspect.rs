//! Save file inspection.
//!
//! A save is replayed into a headless controller through the same confirm
//! path the game uses, so the report shows exactly what a player loading it
//! would get: which records still fit, and whether the rebuilt ledger is
//! consistent.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use township_core::catalog::Catalog;
use township_core::config::PlacementConfig;
use township_core::controller::ToolController;
use township_core::ledger::OccupancyLayer;
use township_core::save::SaveGame;
use township_core::scene::HeadlessScene;

use crate::Result;

/// Result of replaying a save.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SaveReport {
    /// Format version in the file.
    pub version: u32,
    /// Records in the file.
    pub records: usize,
    /// Records placed on replay.
    pub loaded: usize,
    /// Why each remaining record was dropped.
    pub skipped: Vec<String>,
    /// Placed entities per prefab name.
    pub counts: BTreeMap<String, usize>,
    /// Cells held by buildings.
    pub structure_cells: usize,
    /// Cells held by paths.
    pub path_cells: usize,
    /// Ledger problems after replay; empty when consistent.
    pub audit: Vec<String>,
}

impl SaveReport {
    /// Every record loaded and the ledger is consistent.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.audit.is_empty()
    }
}

impl fmt::Display for SaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Save version {}", self.version)?;
        writeln!(f, "Records: {} ({} loaded)", self.records, self.loaded)?;
        for (name, count) in &self.counts {
            writeln!(f, "  {name}: {count}")?;
        }
        writeln!(
            f,
            "Cells: {} structures, {} paths",
            self.structure_cells, self.path_cells
        )?;
        for reason in &self.skipped {
            writeln!(f, "Skipped {reason}")?;
        }
        for problem in &self.audit {
            writeln!(f, "Audit: {problem}")?;
        }
        Ok(())
    }
}

/// Replay `save` against `catalog` and report the outcome.
///
/// # Errors
///
/// Returns an error if the save was written by another format version.
pub fn inspect(save: &SaveGame, catalog: Catalog) -> Result<SaveReport> {
    let mut controller = ToolController::new(PlacementConfig::default(), catalog);
    let mut scene = HeadlessScene::new();
    let load = controller.load(&mut scene, save)?;

    let mut counts = BTreeMap::new();
    for entity in controller.entities() {
        let name = controller
            .catalog()
            .get(entity.type_index)
            .map_or_else(|| format!("#{}", entity.type_index), |prefab| prefab.name.clone());
        *counts.entry(name).or_insert(0) += 1;
    }

    let mut audit = controller.audit();
    if scene.live_instances() != controller.entity_count() {
        audit.push(format!(
            "{} instances live for {} entities",
            scene.live_instances(),
            controller.entity_count()
        ));
    }

    let ledger = controller.ledger();
    Ok(SaveReport {
        version: save.version,
        records: save.len(),
        loaded: load.loaded,
        skipped: load.skipped,
        counts,
        structure_cells: ledger.occupied_count(OccupancyLayer::Structures),
        path_cells: ledger.occupied_count(OccupancyLayer::Paths),
        audit,
    })
}

/// Load a save file and, optionally, a catalog file, then [`inspect`].
///
/// Without a catalog the built-in one is used.
///
/// # Errors
///
/// Returns an error if either file cannot be read or parsed, or the save
/// version does not match.
pub fn inspect_file(save_path: &Path, catalog_path: Option<&Path>) -> Result<SaveReport> {
    let save = SaveGame::load(save_path)?;
    let catalog = match catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::starter(),
    };
    inspect(&save, catalog)
}

/// Render a report as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(report: &SaveReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use township_core::save::PlacedRecord;
    use township_test_utils::fixtures::screen;
    use township_test_utils::{FakeScene, InputScript};

    /// Cottage at (0, 0), workshop at (3, 3), dirt path at (0, 0).
    fn sample_save() -> SaveGame {
        let mut controller = ToolController::default();
        let mut scene = FakeScene::new();
        let mut script = InputScript::new();

        for (type_index, x, z) in [(0, 0.0, 0.0), (1, 3.0, 3.0), (3, 0.0, 0.0)] {
            controller.start_placing(&mut scene, type_index);
            script.click_at(&mut controller, &mut scene, screen(x, z));
            script.cancel(&mut controller, &mut scene);
            script.idle(&mut controller, &mut scene, 4);
        }

        controller.save()
    }

    #[test]
    fn test_clean_save() {
        let save = sample_save();
        let report = inspect(&save, Catalog::starter()).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.records, 3);
        assert_eq!(report.loaded, 3);
        assert_eq!(report.counts.get("workshop"), Some(&1));
        assert_eq!(report.structure_cells, 5);
        assert_eq!(report.path_cells, 1);
    }

    #[test]
    fn test_overlapping_record_is_reported() {
        let mut save = sample_save();
        let mut clash: PlacedRecord = save.entities[0].clone();
        clash.id = township_core::entity::EntityId::generate();
        save.entities.push(clash);

        let report = inspect(&save, Catalog::starter()).unwrap();

        assert!(!report.is_clean());
        assert_eq!(report.loaded, 3);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.audit.is_empty());
        assert!(report.to_string().contains("Skipped"));
    }

    #[test]
    fn test_file_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("town.ron");
        sample_save().save(&path).unwrap();

        let report = inspect_file(&path, None).unwrap();
        let json = to_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["loaded"], 3);
        assert_eq!(value["counts"]["cottage"], 1);
    }
}
