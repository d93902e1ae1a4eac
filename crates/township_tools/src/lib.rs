//! # Township Development Tools
//!
//! Command-line tools for development:
//! - Catalog and placement config validation
//! - Save file inspection (replayed into a headless controller)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

use thiserror::Error;
use township_core::error::PlacementError;

pub mod inspect;
pub mod validate;

/// Errors reported by the tools.
#[derive(Debug, Error)]
pub enum ToolsError {
    /// Loading or validating placement data failed.
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Rendering a report as JSON failed.
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolsError>;
