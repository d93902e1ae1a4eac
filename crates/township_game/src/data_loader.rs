//! Placement data loading for the game client.
//!
//! Reads the prefab catalog and placement tunables from RON files under
//! `assets/data/` at startup. A missing file falls back to the built-in
//! data with a warning; a broken file is reported and also falls back, so
//! the client always starts with a usable controller.

use std::path::Path;

use bevy::prelude::*;
use thiserror::Error;
use township_core::catalog::Catalog;
use township_core::config::PlacementConfig;
use township_core::controller::ToolController;
use township_core::error::PlacementError;

use crate::construction::Township;

/// Directory holding `catalog.ron` and `placement.ron`.
pub const DATA_DIR: &str = "assets/data";

/// Errors that can occur during placement data loading.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// A data file could not be read, parsed or validated.
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// The catalog parsed but lists nothing to build.
    #[error("Catalog '{0}' has no prefabs")]
    EmptyCatalog(String),
}

/// Result type for data loading operations.
pub type DataLoadResult<T> = Result<T, DataLoadError>;

/// Load the catalog from `dir/catalog.ron`, or the starter catalog when the
/// file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed or
/// validated, or lists no prefabs.
pub fn load_catalog(dir: &Path) -> DataLoadResult<Catalog> {
    let path = dir.join("catalog.ron");
    if !path.exists() {
        tracing::warn!(
            "Catalog not found at {}, using the built-in catalog",
            path.display()
        );
        return Ok(Catalog::starter());
    }

    let catalog = Catalog::load(&path)?;
    if catalog.is_empty() {
        return Err(DataLoadError::EmptyCatalog(path.display().to_string()));
    }
    Ok(catalog)
}

/// Load the placement config from `dir/placement.ron`, or defaults when the
/// file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed or
/// validated.
pub fn load_config(dir: &Path) -> DataLoadResult<PlacementConfig> {
    let path = dir.join("placement.ron");
    if !path.exists() {
        tracing::warn!(
            "Placement config not found at {}, using defaults",
            path.display()
        );
        return Ok(PlacementConfig::default());
    }

    Ok(PlacementConfig::load(&path)?)
}

/// Build a controller from the data in `dir`, falling back per file.
#[must_use]
pub fn load_controller(dir: &Path) -> ToolController {
    let config = load_config(dir).unwrap_or_else(|e| {
        tracing::error!("Failed to load placement config: {}", e);
        PlacementConfig::default()
    });
    let catalog = load_catalog(dir).unwrap_or_else(|e| {
        tracing::error!("Failed to load catalog: {}", e);
        Catalog::starter()
    });

    tracing::info!(
        "Placement data ready: {} prefabs, cell size {}",
        catalog.len(),
        config.cell_size
    );

    ToolController::new(config, catalog)
}

/// Bevy plugin for loading placement data.
///
/// Replaces the [`Township`] controller with one built from
/// `assets/data/` before the first frame.
pub struct PlacementDataPlugin;

impl Plugin for PlacementDataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Township>()
            .add_systems(PreStartup, load_placement_data);
    }
}

/// System that loads placement data at startup.
fn load_placement_data(mut township: ResMut<Township>) {
    township.controller = load_controller(Path::new(DATA_DIR));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(load_catalog(dir.path()).unwrap(), Catalog::starter());
        assert_eq!(load_config(dir.path()).unwrap(), PlacementConfig::default());
    }

    #[test]
    fn test_catalog_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("catalog.ron"),
            r#"(prefabs: [(name: "tent", kind: Building, size: (1.0, 1.0))])"#,
        )
        .unwrap();

        let catalog = load_catalog(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.index_of("tent"), Some(0));
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("catalog.ron"), "(prefabs: [])").unwrap();

        assert!(load_catalog(dir.path()).is_err());
    }

    #[test]
    fn test_broken_config_falls_back_in_controller() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("placement.ron"), "(cell_size: -1.0)").unwrap();

        assert!(load_config(dir.path()).is_err());
        let controller = load_controller(dir.path());
        assert_eq!(controller.config(), &PlacementConfig::default());
    }

    #[test]
    fn test_shipped_data_is_valid() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(DATA_DIR);

        let catalog = load_catalog(&dir).unwrap();
        assert!(catalog.validate().is_empty());
        assert!(load_config(&dir).is_ok());
    }
}
