//! # Township Game
//!
//! Game client for Township.
//!
//! This crate hosts the placement core inside Bevy: sprites stand in for
//! the scene, mouse and keyboard feed the tools once per frame, and an
//! egui toolbar lists what can be built.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use bevy::log::LogPlugin;
use bevy::prelude::*;

pub mod camera;
pub mod construction;
pub mod data_loader;
pub mod plugins;
pub mod scene;
pub mod ui;

pub use construction::Township;
pub use plugins::{GamePlugins, HeadlessGamePlugins};

use scene::PIXELS_PER_UNIT;

/// Ground cells drawn on each side of the origin.
pub const GRID_HALF_EXTENT: i32 = 32;

/// Run the game.
///
/// # Errors
///
/// Returns an error if the game fails to initialize.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Township".into(),
                    resolution: (1600.0, 900.0).into(),
                    ..default()
                }),
                ..default()
            })
            .disable::<LogPlugin>(), // Logging already initialized in main.rs
    );

    app.add_plugins(GamePlugins);

    app.insert_resource(ClearColor(Color::srgb(0.2, 0.26, 0.18)));

    app.add_systems(Startup, spawn_ground_grid);

    #[cfg(feature = "dev-tools")]
    {
        tracing::info!("Development tools enabled");
    }

    app.run();

    Ok(())
}

/// Spawns a checkered ground, one tile per grid cell.
fn spawn_ground_grid(mut commands: Commands) {
    for x in -GRID_HALF_EXTENT..GRID_HALF_EXTENT {
        for z in -GRID_HALF_EXTENT..GRID_HALF_EXTENT {
            let color = if (x + z).rem_euclid(2) == 0 {
                Color::srgb(0.24, 0.31, 0.21)
            } else {
                Color::srgb(0.22, 0.29, 0.19)
            };

            commands.spawn(SpriteBundle {
                sprite: Sprite {
                    color,
                    custom_size: Some(Vec2::splat(PIXELS_PER_UNIT)),
                    anchor: bevy::sprite::Anchor::BottomLeft,
                    ..default()
                },
                transform: Transform::from_translation(Vec3::new(
                    x as f32 * PIXELS_PER_UNIT,
                    z as f32 * PIXELS_PER_UNIT,
                    -1.0, // Behind placed entities
                )),
                ..default()
            });
        }
    }

    tracing::info!("Spawned ground grid");
}
