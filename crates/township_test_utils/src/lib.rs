//! # Township Test Utilities
//!
//! Shared testing utilities for the placement core and the game client:
//! - Fixture catalogs and controllers
//! - A recording fake scene standing in for rendering and ray casts
//! - Scripted per-tick input
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod scene;
pub mod script;
pub mod strategies;

pub use scene::FakeScene;
pub use script::InputScript;

/// Re-export proptest for convenience.
pub use proptest;
