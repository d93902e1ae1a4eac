//! Data validation utilities.

use std::fmt;
use std::path::Path;

use township_core::catalog::{Catalog, PrefabKind};
use township_core::config::PlacementConfig;

use crate::Result;

/// What a successful validation covered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Building prefabs in the catalog.
    pub buildings: usize,
    /// Path prefabs in the catalog.
    pub paths: usize,
    /// A placement config was found next to the catalog and checked.
    pub config_checked: bool,
}

impl fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} buildings, {} paths", self.buildings, self.paths)?;
        if self.config_checked {
            write!(f, ", placement config ok")?;
        }
        Ok(())
    }
}

/// Validate a catalog file, or a data directory holding `catalog.ron` and
/// optionally `placement.ron`.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or fails validation.
pub fn validate_catalog(path: &Path) -> Result<ValidationSummary> {
    if !path.is_dir() {
        return Ok(summarize(&Catalog::load(path)?));
    }

    let mut summary = summarize(&Catalog::load(&path.join("catalog.ron"))?);

    let config = path.join("placement.ron");
    if config.exists() {
        PlacementConfig::load(&config)?;
        summary.config_checked = true;
    } else {
        tracing::debug!("No placement config in {}", path.display());
    }

    Ok(summary)
}

fn summarize(catalog: &Catalog) -> ValidationSummary {
    let buildings = catalog
        .iter()
        .filter(|(_, prefab)| prefab.kind == PrefabKind::Building)
        .count();
    ValidationSummary {
        buildings,
        paths: catalog.len() - buildings,
        config_checked: false,
    }
}
