//! Error types for loading and persisting placement data.
//!
//! The interactive placement surface never returns these: an invalid
//! confirm or an unknown id is a routine condition answered with `false`.
//! Errors only cover catalog, config and save data crossing a file or
//! encoding boundary.

use thiserror::Error;

/// Result type alias using [`PlacementError`].
pub type Result<T> = std::result::Result<T, PlacementError>;

/// Top-level error type for placement data handling.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// Failed to read or write a file.
    #[error("Failed to access file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a RON document.
    #[error("Failed to parse RON '{path}': {source}")]
    Parse {
        /// Path (or label) of the document that failed to parse.
        path: String,
        /// Underlying parse error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// Catalog data failed validation.
    #[error("Invalid catalog: {0:?}")]
    InvalidCatalog(Vec<String>),

    /// Placement configuration failed validation.
    #[error("Invalid placement config: {0}")]
    InvalidConfig(String),

    /// Save data was written by an incompatible format version.
    #[error("Save version mismatch: expected {expected}, found {found}")]
    SaveVersionMismatch {
        /// Version this build understands.
        expected: u32,
        /// Version found in the data.
        found: u32,
    },

    /// Serialization or deserialization of binary/text data failed.
    #[error("Encoding error: {0}")]
    Encode(String),

    /// A type index does not exist in the catalog.
    #[error("Unknown prefab type index: {0}")]
    UnknownPrefab(usize),
}
