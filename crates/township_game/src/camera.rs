//! Town view camera.
//!
//! The camera looks down at the ground grid. Keys pan it in cells per
//! second, the wheel steps the zoom, and a right-button drag moves the view
//! while the tools read short right taps as cancels. The view centre never
//! leaves the ground.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

use crate::scene::PIXELS_PER_UNIT;
use crate::GRID_HALF_EXTENT;

/// Camera plugin for the town view.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TownView>()
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (keyboard_pan, wheel_zoom, drag_pan, keep_over_ground).chain(),
            );
    }
}

/// How the town view moves.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TownView {
    /// Keyboard pan speed in cells per second at scale 1.
    pub cells_per_second: f32,
    /// Scale change per wheel line.
    pub zoom_step: f32,
    /// Closest scale.
    pub min_scale: f32,
    /// Farthest scale.
    pub max_scale: f32,
    /// Cells the view centre may travel from the origin on each axis.
    pub half_extent: i32,
}

impl Default for TownView {
    fn default() -> Self {
        Self {
            cells_per_second: 16.0,
            zoom_step: 0.1,
            min_scale: 0.5,
            max_scale: 2.5,
            half_extent: GRID_HALF_EXTENT,
        }
    }
}

impl TownView {
    /// Scale after `lines` wheel lines; positive lines zoom in.
    #[must_use]
    pub fn zoomed(&self, scale: f32, lines: f32) -> f32 {
        (scale - lines * self.zoom_step).clamp(self.min_scale, self.max_scale)
    }

    /// Pull a view centre (sprite space) back over the ground.
    #[must_use]
    pub fn clamp_centre(&self, centre: Vec2) -> Vec2 {
        let limit = self.half_extent as f32 * PIXELS_PER_UNIT;
        centre.clamp(Vec2::splat(-limit), Vec2::splat(limit))
    }

    /// Sprite-space distance a held pan key covers in `seconds`.
    #[must_use]
    pub fn pan_distance(&self, seconds: f32, scale: f32) -> f32 {
        self.cells_per_second * PIXELS_PER_UNIT * seconds * scale
    }
}

/// Marker component for the main game camera.
#[derive(Component)]
pub struct MainCamera;

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2dBundle::default(), MainCamera));
}

/// Unit direction of the held WASD / arrow keys, world `+z` up.
fn pan_direction(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    let held = |a: KeyCode, b: KeyCode| keyboard.pressed(a) || keyboard.pressed(b);
    let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));

    Vec2::new(
        axis(
            held(KeyCode::KeyA, KeyCode::ArrowLeft),
            held(KeyCode::KeyD, KeyCode::ArrowRight),
        ),
        axis(
            held(KeyCode::KeyS, KeyCode::ArrowDown),
            held(KeyCode::KeyW, KeyCode::ArrowUp),
        ),
    )
    .normalize_or_zero()
}

fn keyboard_pan(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    view: Res<TownView>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let direction = pan_direction(&keyboard);
    if direction == Vec2::ZERO {
        return;
    }
    let Ok(mut transform) = cameras.get_single_mut() else {
        return;
    };

    let delta = direction * view.pan_distance(time.delta_seconds(), transform.scale.x);
    transform.translation += delta.extend(0.0);
}

fn wheel_zoom(
    mut wheel: EventReader<MouseWheel>,
    view: Res<TownView>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let lines: f32 = wheel.read().map(|event| event.y).sum();
    if lines == 0.0 {
        return;
    }
    let Ok(mut transform) = cameras.get_single_mut() else {
        return;
    };

    transform.scale = Vec3::splat(view.zoomed(transform.scale.x, lines));
}

fn drag_pan(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let delta: Vec2 = motion.read().map(|event| event.delta).sum();
    if !mouse.pressed(MouseButton::Right) || delta == Vec2::ZERO {
        return;
    }
    let Ok(mut transform) = cameras.get_single_mut() else {
        return;
    };

    // Window y grows downwards
    let scale = transform.scale.x;
    transform.translation.x -= delta.x * scale;
    transform.translation.y += delta.y * scale;
}

fn keep_over_ground(view: Res<TownView>, mut cameras: Query<&mut Transform, With<MainCamera>>) {
    for mut transform in &mut cameras {
        let centre = view.clamp_centre(transform.translation.truncate());
        if centre != transform.translation.truncate() {
            transform.translation = centre.extend(transform.translation.z);
        }
    }
}
