//! Prefab catalog.
//!
//! Everything placeable is a catalog entry addressed by its index
//! (`type_index`). Entries are pure data, loaded from RON.
//!
//! # Example RON
//!
//! ```ron
//! Catalog(
//!     prefabs: [
//!         PrefabDef(name: "cottage", kind: Building, size: (1.0, 1.0)),
//!         PrefabDef(name: "dirt_path", kind: Path, speed_modifier: 0.5),
//!     ],
//! )
//! ```

use std::collections::HashSet;
use std::path::Path;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{PlacementError, Result};
use crate::grid::Bounds;

/// What kind of placement a prefab produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrefabKind {
    /// Blocking structure placed with the build tool.
    Building,
    /// Non-blocking tile painted with the path tool.
    Path,
}

/// One placeable prefab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabDef {
    /// Unique name.
    pub name: String,

    /// Building or path.
    pub kind: PrefabKind,

    /// Planar size `(x, z)` in world units, measured from the pivot.
    #[serde(default = "default_size")]
    pub size: Vec2,

    /// Authored yaw. Player rotation is applied on top of this.
    #[serde(default)]
    pub base_yaw_degrees: f32,

    /// Speed modifier written to every covered cell.
    #[serde(default)]
    pub speed_modifier: f32,

    /// Local `(x, z)` point whose cell is always kept passable.
    #[serde(default)]
    pub entrance: Option<Vec2>,

    /// Display colour (RGB).
    #[serde(default = "default_color")]
    pub color: [u8; 3],
}

fn default_size() -> Vec2 {
    Vec2::ONE
}

const fn default_color() -> [u8; 3] {
    [180, 180, 180]
}

impl PrefabDef {
    /// Create a prefab with default extras.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: PrefabKind, size: Vec2) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            base_yaw_degrees: 0.0,
            speed_modifier: 0.0,
            entrance: None,
            color: default_color(),
        }
    }

    /// Set the speed modifier.
    #[must_use]
    pub fn with_speed_modifier(mut self, value: f32) -> Self {
        self.speed_modifier = value;
        self
    }

    /// Set the entrance anchor.
    #[must_use]
    pub fn with_entrance(mut self, local: Vec2) -> Self {
        self.entrance = Some(local);
        self
    }

    /// Set the authored yaw.
    #[must_use]
    pub fn with_base_yaw(mut self, degrees: f32) -> Self {
        self.base_yaw_degrees = degrees;
        self
    }

    /// Set the display colour.
    #[must_use]
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// Orientation the prefab was authored with.
    #[must_use]
    pub fn base_orientation(&self) -> Quat {
        Quat::from_rotation_y(self.base_yaw_degrees.to_radians())
    }

    /// World bounds of this prefab placed at `position` with `rotation`.
    #[must_use]
    pub fn bounds_at(&self, position: Vec3, rotation: Quat) -> Bounds {
        Bounds::of_rotated_rect(Vec2::ZERO, self.size, position, rotation)
    }

    /// World position of the entrance anchor, if the prefab has one.
    #[must_use]
    pub fn entrance_at(&self, position: Vec3, rotation: Quat) -> Option<Vec3> {
        self.entrance
            .map(|local| position + rotation * Vec3::new(local.x, 0.0, local.y))
    }
}

/// All placeable prefabs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Prefabs in `type_index` order.
    pub prefabs: Vec<PrefabDef>,
}

impl Catalog {
    /// Create a catalog from prefabs.
    #[must_use]
    pub fn new(prefabs: Vec<PrefabDef>) -> Self {
        Self { prefabs }
    }

    /// Built-in catalog used when no data file is available.
    #[must_use]
    pub fn starter() -> Self {
        Self::new(vec![
            PrefabDef::new("cottage", PrefabKind::Building, Vec2::new(1.0, 1.0))
                .with_color([196, 140, 92]),
            PrefabDef::new("workshop", PrefabKind::Building, Vec2::new(2.0, 2.0))
                .with_speed_modifier(-1.0)
                .with_entrance(Vec2::new(0.5, 0.5))
                .with_color([150, 110, 170]),
            PrefabDef::new("warehouse", PrefabKind::Building, Vec2::new(3.0, 2.0))
                .with_speed_modifier(-1.0)
                .with_entrance(Vec2::new(1.5, 0.5))
                .with_color([120, 130, 150]),
            PrefabDef::new("dirt_path", PrefabKind::Path, Vec2::ONE)
                .with_speed_modifier(0.5)
                .with_color([160, 130, 90]),
            PrefabDef::new("paved_road", PrefabKind::Path, Vec2::ONE)
                .with_speed_modifier(1.0)
                .with_color([90, 90, 95]),
        ])
    }

    /// Prefab for a type index.
    #[must_use]
    pub fn get(&self, type_index: usize) -> Option<&PrefabDef> {
        self.prefabs.get(type_index)
    }

    /// Prefab for a type index, or [`PlacementError::UnknownPrefab`].
    ///
    /// # Errors
    /// Returns an error if no prefab has that index.
    pub fn require(&self, type_index: usize) -> Result<&PrefabDef> {
        self.get(type_index)
            .ok_or(PlacementError::UnknownPrefab(type_index))
    }

    /// Number of prefabs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }

    /// `(type_index, prefab)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PrefabDef)> {
        self.prefabs.iter().enumerate()
    }

    /// Index of the first prefab of a kind.
    #[must_use]
    pub fn first_of_kind(&self, kind: PrefabKind) -> Option<usize> {
        self.iter()
            .find(|(_, prefab)| prefab.kind == kind)
            .map(|(index, _)| index)
    }

    /// Index of the prefab named `name`.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.iter()
            .find(|(_, prefab)| prefab.name == name)
            .map(|(index, _)| index)
    }

    /// Check data integrity. Returns one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();

        for (index, prefab) in self.iter() {
            if prefab.name.trim().is_empty() {
                errors.push(format!("prefab {index} has an empty name"));
            }
            if !names.insert(prefab.name.as_str()) {
                errors.push(format!("duplicate prefab name '{}'", prefab.name));
            }
            if !(prefab.size.x > 0.0 && prefab.size.y > 0.0) {
                errors.push(format!(
                    "prefab '{}' has non-positive size {:?}",
                    prefab.name, prefab.size
                ));
            }
            if !prefab.speed_modifier.is_finite() {
                errors.push(format!("prefab '{}' has a non-finite speed modifier", prefab.name));
            }
            if prefab.kind == PrefabKind::Path && prefab.entrance.is_some() {
                errors.push(format!("path prefab '{}' cannot have an entrance", prefab.name));
            }
        }

        errors
    }

    /// Parse and validate a catalog from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let catalog: Self = ron::from_str(text).map_err(|e| PlacementError::Parse {
            path: "<catalog>".to_string(),
            source: e,
        })?;
        catalog.ensure_valid()?;
        Ok(catalog)
    }

    /// Load and validate a catalog from a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let path_str = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| PlacementError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let catalog: Self = ron::from_str(&text).map_err(|e| PlacementError::Parse {
            path: path_str,
            source: e,
        })?;
        catalog.ensure_valid()?;

        tracing::info!(
            "Loaded catalog with {} prefabs from {}",
            catalog.len(),
            path.display()
        );

        Ok(catalog)
    }

    fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PlacementError::InvalidCatalog(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_catalog_is_valid() {
        let catalog = Catalog::starter();
        assert!(catalog.validate().is_empty());
        assert_eq!(catalog.first_of_kind(PrefabKind::Path), Some(3));
        assert_eq!(catalog.index_of("workshop"), Some(1));
    }

    #[test]
    fn test_require_reports_unknown_index() {
        let catalog = Catalog::starter();
        assert_eq!(catalog.require(3).unwrap().name, "dirt_path");
        assert!(matches!(
            catalog.require(catalog.len()),
            Err(PlacementError::UnknownPrefab(index)) if index == catalog.len()
        ));
    }

    #[test]
    fn test_parse_catalog_ron() {
        let catalog = Catalog::from_ron_str(
            r#"Catalog(
                prefabs: [
                    PrefabDef(name: "hut", kind: Building, size: (2.0, 1.0)),
                    PrefabDef(name: "trail", kind: Path, speed_modifier: 0.25),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().size, Vec2::new(2.0, 1.0));
        assert_eq!(catalog.get(1).unwrap().size, Vec2::ONE);
        assert_eq!(catalog.get(1).unwrap().speed_modifier, 0.25);
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn test_validation_errors() {
        let catalog = Catalog::new(vec![
            PrefabDef::new("a", PrefabKind::Building, Vec2::new(0.0, 1.0)),
            PrefabDef::new("a", PrefabKind::Path, Vec2::ONE).with_entrance(Vec2::ZERO),
        ]);
        let errors = catalog.validate();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_invalid_catalog_rejected_on_parse() {
        let result = Catalog::from_ron_str(r#"Catalog(prefabs: [PrefabDef(name: "", kind: Path)])"#);
        assert!(matches!(result, Err(PlacementError::InvalidCatalog(_))));
    }

    #[test]
    fn test_entrance_follows_rotation() {
        let prefab = PrefabDef::new("w", PrefabKind::Building, Vec2::new(2.0, 2.0))
            .with_entrance(Vec2::new(0.5, 0.5));
        let rotation = Quat::from_rotation_y(180f32.to_radians());
        let entrance = prefab.entrance_at(Vec3::new(4.0, 0.0, 4.0), rotation).unwrap();
        assert!(entrance.abs_diff_eq(Vec3::new(3.5, 0.0, 3.5), 1e-4));
    }
}
