//! Persisted placement records.
//!
//! A save lists every placed entity with enough data to rebuild it through
//! the normal confirm path. Two encodings share one format version:
//! pretty RON for humans and bincode for compact quicksaves. Files ending
//! in `.ron` are written as RON, everything else as bincode.

use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, PlacedEntity};
use crate::error::{PlacementError, Result};
use crate::grid::Cell;

/// Save format version for compatibility.
pub const SAVE_VERSION: u32 = 1;

/// One placed entity as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRecord {
    /// Stable identifier.
    pub id: EntityId,
    /// Catalog index.
    pub type_index: usize,
    /// Pivot position.
    pub position: Vec3,
    /// World orientation at save time.
    pub rotation: Quat,
    /// Player rotation in degrees, used when rebuilding.
    pub angle: f32,
    /// Cells covered at save time.
    pub footprint: Vec<Cell>,
    /// Speed modifier carried by the covered cells.
    pub speed_modifier: f32,
}

impl From<&PlacedEntity> for PlacedRecord {
    fn from(entity: &PlacedEntity) -> Self {
        Self {
            id: entity.id,
            type_index: entity.type_index,
            position: entity.position,
            rotation: entity.rotation,
            angle: entity.angle,
            footprint: entity.footprint.to_vec(),
            speed_modifier: entity.speed_modifier,
        }
    }
}

/// A complete placement snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    /// Save format version.
    pub version: u32,
    /// Every placed entity.
    pub entities: Vec<PlacedRecord>,
}

impl Default for SaveGame {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            entities: Vec::new(),
        }
    }
}

/// Outcome of rebuilding a world from a save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records placed.
    pub loaded: usize,
    /// One message per record that could not be placed.
    pub skipped: Vec<String>,
}

impl SaveGame {
    /// Snapshot a set of entities.
    #[must_use]
    pub fn from_entities<'a>(entities: impl IntoIterator<Item = &'a PlacedEntity>) -> Self {
        Self {
            version: SAVE_VERSION,
            entities: entities.into_iter().map(PlacedRecord::from).collect(),
        }
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the save holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Encode as pretty RON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| PlacementError::Encode(format!("Failed to serialize save: {e}")))
    }

    /// Decode from RON and check the version.
    ///
    /// # Errors
    /// Returns an error on malformed text or a version mismatch.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let save: Self = ron::from_str(text).map_err(|e| PlacementError::Parse {
            path: "<save>".to_string(),
            source: e,
        })?;
        save.check_version()?;
        Ok(save)
    }

    /// Encode as bincode.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| PlacementError::Encode(format!("Failed to serialize save: {e}")))
    }

    /// Decode from bincode and check the version.
    ///
    /// # Errors
    /// Returns an error on malformed bytes or a version mismatch.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let save: Self = bincode::deserialize(bytes)
            .map_err(|e| PlacementError::Encode(format!("Failed to deserialize save: {e}")))?;
        save.check_version()?;
        Ok(save)
    }

    /// Write to a file, RON or bincode by extension.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = if is_ron(path) {
            self.to_ron_string()?.into_bytes()
        } else {
            self.to_bytes()?
        };
        std::fs::write(path, bytes).map_err(|e| PlacementError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        tracing::info!("Saved {} entities to {}", self.len(), path.display());
        Ok(())
    }

    /// Read from a file, RON or bincode by extension.
    ///
    /// # Errors
    /// Returns an error if reading or decoding fails, or on a version mismatch.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let io_error = |e| PlacementError::Io {
            path: path.display().to_string(),
            source: e,
        };

        let save = if is_ron(path) {
            let text = std::fs::read_to_string(path).map_err(io_error)?;
            let save: Self = ron::from_str(&text).map_err(|e| PlacementError::Parse {
                path: path.display().to_string(),
                source: e,
            })?;
            save.check_version()?;
            save
        } else {
            let bytes = std::fs::read(path).map_err(io_error)?;
            Self::from_bytes(&bytes)?
        };

        tracing::info!("Read {} entities from {}", save.len(), path.display());
        Ok(save)
    }

    fn check_version(&self) -> Result<()> {
        if self.version == SAVE_VERSION {
            Ok(())
        } else {
            Err(PlacementError::SaveVersionMismatch {
                expected: SAVE_VERSION,
                found: self.version,
            })
        }
    }
}

fn is_ron(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    fn record() -> PlacedEntity {
        PlacedEntity {
            id: EntityId::generate(),
            type_index: 3,
            kind: EntityKind::Path,
            position: Vec3::new(2.0, 0.0, 5.0),
            rotation: Quat::IDENTITY,
            angle: 90.0,
            footprint: [Cell::new(2, 5)].into_iter().collect(),
            speed_modifier: 0.5,
            entrance: None,
            instance: None,
        }
    }

    #[test]
    fn test_ron_keeps_ids() {
        let entity = record();
        let save = SaveGame::from_entities([&entity]);
        let text = save.to_ron_string().unwrap();
        let loaded = SaveGame::from_ron_str(&text).unwrap();

        assert_eq!(loaded.entities[0].id, entity.id);
        assert_eq!(loaded.entities[0].footprint, vec![Cell::new(2, 5)]);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let save = SaveGame {
            version: SAVE_VERSION + 1,
            entities: Vec::new(),
        };
        let bytes = save.to_bytes().unwrap();
        assert!(matches!(
            SaveGame::from_bytes(&bytes),
            Err(PlacementError::SaveVersionMismatch { found, .. }) if found == SAVE_VERSION + 1
        ));
    }

    #[test]
    fn test_file_format_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        let save = SaveGame::from_entities([&record()]);

        let ron_path = dir.path().join("world.ron");
        save.save(&ron_path).unwrap();
        let text = std::fs::read_to_string(&ron_path).unwrap();
        assert!(text.contains("entities"));
        assert_eq!(SaveGame::load(&ron_path).unwrap(), save);

        let bin_path = dir.path().join("world.sav");
        save.save(&bin_path).unwrap();
        assert_eq!(SaveGame::load(&bin_path).unwrap(), save);
    }
}
