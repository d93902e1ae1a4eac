//! Placement tuning constants.
//!
//! Loaded from RON so designers can tune rotation feel and click
//! thresholds without a rebuild. Missing fields fall back to defaults.
//!
//! # Example RON
//!
//! ```ron
//! PlacementConfig(
//!     cell_size: 1.0,
//!     hold_threshold_secs: 0.2,
//!     building_coarse_step_degrees: 15.0,
//! )
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{PlacementError, Result};

/// Tunables shared by the grid and every placement tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// World units per grid cell.
    pub cell_size: f32,
    /// World position of the corner of cell (0, 0).
    pub grid_origin: Vec3,
    /// Amount each bounds face is pulled inwards before flooring to cells.
    pub footprint_epsilon: f32,
    /// Rotate-key hold time before fine rotation starts.
    pub hold_threshold_secs: f64,
    /// Degrees added per tick while in fine rotation.
    pub fine_step_degrees: f32,
    /// Degrees added per rotate tap on building previews.
    pub building_coarse_step_degrees: f32,
    /// Degrees added per rotate tap on path previews.
    pub path_coarse_step_degrees: f32,
    /// Longest right-button press still counted as a click.
    pub click_max_duration_secs: f64,
    /// Largest cursor travel (pixels) still counted as a click.
    pub click_max_drag_pixels: f32,
    /// Minimum time between two painted path tiles.
    pub path_placement_interval_secs: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            grid_origin: Vec3::ZERO,
            footprint_epsilon: 0.01,
            hold_threshold_secs: 0.2,
            fine_step_degrees: 0.25,
            building_coarse_step_degrees: 15.0,
            path_coarse_step_degrees: 90.0,
            click_max_duration_secs: 0.25,
            click_max_drag_pixels: 5.0,
            path_placement_interval_secs: 0.05,
        }
    }
}

impl PlacementConfig {
    /// Check value ranges. Returns one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.cell_size > 0.0) {
            errors.push(format!("cell_size must be positive, got {}", self.cell_size));
        }
        if !(self.footprint_epsilon > 0.0) || self.footprint_epsilon >= self.cell_size / 2.0 {
            errors.push(format!(
                "footprint_epsilon must be in (0, cell_size / 2), got {}",
                self.footprint_epsilon
            ));
        }
        if self.hold_threshold_secs < 0.0 {
            errors.push("hold_threshold_secs must not be negative".to_string());
        }
        if !(self.fine_step_degrees > 0.0) {
            errors.push("fine_step_degrees must be positive".to_string());
        }
        for (name, step) in [
            ("building_coarse_step_degrees", self.building_coarse_step_degrees),
            ("path_coarse_step_degrees", self.path_coarse_step_degrees),
        ] {
            if !(step > 0.0 && step <= 360.0) {
                errors.push(format!("{name} must be in (0, 360], got {step}"));
            }
        }
        if self.click_max_duration_secs < 0.0 || self.click_max_drag_pixels < 0.0 {
            errors.push("click thresholds must not be negative".to_string());
        }
        if self.path_placement_interval_secs < 0.0 {
            errors.push("path_placement_interval_secs must not be negative".to_string());
        }

        errors
    }

    /// Parse and validate a config from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| PlacementError::Parse {
            path: "<placement config>".to_string(),
            source: e,
        })?;
        config.ensure_valid()?;
        Ok(config)
    }

    /// Load and validate a config from a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let path_str = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| PlacementError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let config: Self = ron::from_str(&text).map_err(|e| PlacementError::Parse {
            path: path_str,
            source: e,
        })?;
        config.ensure_valid()?;

        tracing::info!(
            "Loaded placement config from {} (cell size {})",
            path.display(),
            config.cell_size
        );

        Ok(config)
    }

    fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PlacementError::InvalidConfig(errors.join("; ")))
        }
    }
}
