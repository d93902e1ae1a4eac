//! Construction tools in the game client.
//!
//! Samples mouse and keyboard once per frame into a [`TickInput`], routes
//! hotkeys to the tool controller, ticks the active tool against a
//! [`FrameScene`] and handles quicksave/quickload.

use std::collections::VecDeque;
use std::path::Path;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use township_core::controller::ToolController;
use township_core::events::PlacementEvent;
use township_core::grid::Cell;
use township_core::input::{ButtonState, TickInput};
use township_core::save::SaveGame;
use township_core::tools::ToolMode;

use crate::camera::MainCamera;
use crate::scene::{sync_instance_sprites, sprite_to_world, FrameScene, InstanceMap, SceneMirror};

/// Where F5 writes and F9 reads.
pub const QUICKSAVE_PATH: &str = "saves/quicksave.ron";

/// Messages kept for the toolbar.
const LOG_CAPACITY: usize = 8;

/// Plugin for the placement tools.
pub struct ConstructionPlugin;

impl Plugin for ConstructionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<Township>()
            .init_resource::<SceneMirror>()
            .init_resource::<InstanceMap>()
            .init_resource::<FrameInput>()
            .init_resource::<HoveredCell>()
            .init_resource::<PointerOverUi>()
            .init_resource::<PlacementLog>()
            .add_systems(
                Update,
                (
                    gather_tick_input,
                    construction_hotkeys,
                    tick_placement_tools,
                    record_placement_events,
                    quicksave_hotkeys,
                    sync_instance_sprites,
                )
                    .chain(),
            );
    }
}

/// The placement controller.
#[derive(Resource, Default)]
pub struct Township {
    /// Tool slot, ledger and placed entities.
    pub controller: ToolController,
}

/// Input sampled this frame.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FrameInput(pub TickInput);

/// Grid cell under the cursor, if the cursor is over the ground.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoveredCell(pub Option<Cell>);

/// Set while egui owns the pointer; clicks are then kept from the tools.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerOverUi(pub bool);

/// Recent placement messages, newest last.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlacementLog {
    entries: VecDeque<String>,
}

impl PlacementLog {
    /// Append a message, dropping the oldest beyond capacity.
    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    /// Messages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scene access for systems that drive the controller.
#[derive(SystemParam)]
pub struct SceneAccess<'w, 's> {
    mirror: ResMut<'w, SceneMirror>,
    cameras: Query<'w, 's, (&'static Camera, &'static GlobalTransform), With<MainCamera>>,
}

impl SceneAccess<'_, '_> {
    /// Scene for this frame with picking snapshotted from `controller`.
    pub fn frame(&mut self, controller: &ToolController) -> FrameScene<'_> {
        let view = self.cameras.get_single().ok();
        FrameScene::new(&mut self.mirror, view).with_picking(controller)
    }
}

fn button(input: &ButtonInput<MouseButton>, button: MouseButton) -> ButtonState {
    ButtonState {
        pressed: input.pressed(button),
        just_pressed: input.just_pressed(button),
        just_released: input.just_released(button),
    }
}

fn key(input: &ButtonInput<KeyCode>, key: KeyCode) -> ButtonState {
    ButtonState {
        pressed: input.pressed(key),
        just_pressed: input.just_pressed(key),
        just_released: input.just_released(key),
    }
}

/// Primary button as the tools see it: idle while egui owns the pointer,
/// so a toolbar click never paints or confirms on the ground below.
fn world_button(input: &ButtonInput<MouseButton>, over_ui: bool) -> ButtonState {
    if over_ui {
        ButtonState::IDLE
    } else {
        button(input, MouseButton::Left)
    }
}

/// Samples devices into [`FrameInput`] and updates [`HoveredCell`].
fn gather_tick_input(
    time: Res<Time>,
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    pointer_over_ui: Res<PointerOverUi>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    township: Res<Township>,
    mut frame_input: ResMut<FrameInput>,
    mut hovered: ResMut<HoveredCell>,
) {
    let cursor = windows
        .get_single()
        .ok()
        .and_then(|window| window.cursor_position());

    frame_input.0 = TickInput {
        time: time.elapsed_seconds_f64(),
        cursor,
        primary: world_button(&mouse, pointer_over_ui.0),
        secondary: button(&mouse, MouseButton::Right),
        rotate: key(&keyboard, KeyCode::KeyR),
        modifier: keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight),
        cancel: keyboard.just_pressed(KeyCode::Escape),
    };

    hovered.0 = cursor
        .zip(cameras.get_single().ok())
        .and_then(|(cursor, (camera, transform))| camera.viewport_to_world_2d(transform, cursor))
        .map(|point| township.controller.grid().cell_of(sprite_to_world(point)));
}

const DIGITS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// Digits pick catalog entries, M moves, X destroys.
fn construction_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut township: ResMut<Township>,
    mut scene: SceneAccess,
) {
    let controller = &mut township.controller;

    if let Some(type_index) = DIGITS.iter().position(|key| keyboard.just_pressed(*key)) {
        let mut frame = scene.frame(controller);
        if !controller.start_placing(&mut frame, type_index) {
            tracing::debug!("No catalog entry on key {}", type_index + 1);
        }
        return;
    }

    let requested = if keyboard.just_pressed(KeyCode::KeyM) {
        Some(ToolMode::Move)
    } else if keyboard.just_pressed(KeyCode::KeyX) {
        Some(ToolMode::Destroy)
    } else {
        None
    };

    if let Some(mode) = requested {
        let target = if controller.mode() == mode {
            ToolMode::None
        } else {
            mode
        };
        let mut frame = scene.frame(controller);
        controller.set_tool_active(&mut frame, target);
    }
}

/// Runs the active tool for this frame.
fn tick_placement_tools(
    frame_input: Res<FrameInput>,
    mut township: ResMut<Township>,
    mut scene: SceneAccess,
) {
    let controller = &mut township.controller;
    let mut frame = scene.frame(controller);
    controller.tick(&mut frame, &frame_input.0);
}

/// Moves drained controller events into the toolbar log.
fn record_placement_events(mut township: ResMut<Township>, mut log: ResMut<PlacementLog>) {
    for event in township.controller.drain_events() {
        let message = match event {
            PlacementEvent::Placed { type_index, .. } => {
                let name = township
                    .controller
                    .catalog()
                    .get(type_index)
                    .map_or("?", |prefab| prefab.name.as_str());
                format!("Placed {name}")
            }
            PlacementEvent::Moved { to, .. } => format!("Moved to {} cells", to.len()),
            PlacementEvent::MoveRolledBack { .. } => "Move cancelled".to_string(),
            PlacementEvent::Removed { kind, .. } => format!("Removed {kind:?}"),
            PlacementEvent::PreviewCancelled { .. } => continue,
            PlacementEvent::ToolChanged { to, .. } => format!("Tool: {to}"),
        };
        tracing::trace!("{}", message);
        log.push(message);
    }
}

/// F5 writes the quicksave, F9 loads it.
fn quicksave_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut township: ResMut<Township>,
    mut scene: SceneAccess,
    mut log: ResMut<PlacementLog>,
) {
    let path = Path::new(QUICKSAVE_PATH);

    if keyboard.just_pressed(KeyCode::F5) {
        match quicksave(&township.controller, path) {
            Ok(()) => log.push(format!("Saved {}", path.display())),
            Err(e) => {
                tracing::error!("Quicksave failed: {}", e);
                log.push("Quicksave failed");
            }
        }
    }

    if keyboard.just_pressed(KeyCode::F9) {
        let save = match SaveGame::load(path) {
            Ok(save) => save,
            Err(e) => {
                tracing::error!("Quickload failed: {}", e);
                log.push("Quickload failed");
                return;
            }
        };

        let controller = &mut township.controller;
        let mut frame = scene.frame(controller);
        match controller.load(&mut frame, &save) {
            Ok(report) if report.skipped.is_empty() => {
                log.push(format!("Loaded {} entities", report.loaded));
            }
            Ok(report) => {
                log.push(format!(
                    "Loaded {} entities, skipped {}",
                    report.loaded,
                    report.skipped.len()
                ));
            }
            Err(e) => {
                tracing::error!("Quickload failed: {}", e);
                log.push("Quickload failed");
            }
        }
    }
}

fn quicksave(controller: &ToolController, path: &Path) -> township_core::error::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| township_core::error::PlacementError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    controller.save().save(path)
}
