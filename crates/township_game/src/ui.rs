//! UI plugin for the construction toolbar using egui.
//!
//! Lists the catalog and the move/destroy tools, and shows what the
//! controller is doing: active tool, hovered cell, recent events.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use township_core::catalog::PrefabKind;
use township_core::tools::{MoveState, ToolMode};

use crate::construction::{HoveredCell, PlacementLog, PointerOverUi, SceneAccess, Township};

/// Plugin for the construction toolbar.
pub struct GameUiPlugin;

impl Plugin for GameUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<PointerOverUi>()
            .add_systems(Update, (track_ui_pointer, ui_toolbar).chain());
    }
}

/// Records whether egui is using the pointer this frame.
fn track_ui_pointer(mut contexts: EguiContexts, mut pointer_over_ui: ResMut<PointerOverUi>) {
    pointer_over_ui.0 = contexts
        .try_ctx_mut()
        .is_some_and(|ctx| ctx.is_pointer_over_area() || ctx.wants_pointer_input());
}

fn ui_toolbar(
    mut contexts: EguiContexts,
    mut township: ResMut<Township>,
    mut scene: SceneAccess,
    hovered: Res<HoveredCell>,
    log: Res<PlacementLog>,
) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };

    let mut start: Option<usize> = None;
    let mut switch: Option<ToolMode> = None;

    let controller = &township.controller;
    let mode = controller.mode();
    let placing = controller.preview().map(|preview| preview.type_index());

    egui::Window::new("Build")
        .anchor(egui::Align2::LEFT_CENTER, [10.0, 0.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("Buildings [1-9]").strong());
            ui.separator();

            let mut last_kind = None;
            for (index, prefab) in controller.catalog().iter() {
                if last_kind == Some(PrefabKind::Building) && prefab.kind == PrefabKind::Path {
                    ui.separator();
                    ui.label(egui::RichText::new("Paths").strong());
                }
                last_kind = Some(prefab.kind);

                let selected =
                    placing == Some(index) && matches!(mode, ToolMode::Build | ToolMode::Path);
                let label = match index {
                    0..=8 => format!("[{}] {}", index + 1, prefab.name),
                    _ => prefab.name.clone(),
                };
                if ui.selectable_label(selected, label).clicked() {
                    start = Some(index);
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                for (tool, label) in [
                    (ToolMode::Move, "Move [M]"),
                    (ToolMode::Destroy, "Destroy [X]"),
                ] {
                    if ui.selectable_label(mode == tool, label).clicked() {
                        switch = Some(if mode == tool { ToolMode::None } else { tool });
                    }
                }
            });

            ui.separator();
            let status = match (mode, controller.move_state()) {
                (ToolMode::Move, MoveState::Dragging) => {
                    "Move: click to drop, right-click to cancel".to_string()
                }
                (ToolMode::Move, _) => "Move: click a building or path".to_string(),
                (ToolMode::None, _) => "Idle".to_string(),
                (mode, _) => format!("{mode}: R rotate, Shift repeat, Esc cancel"),
            };
            ui.label(egui::RichText::new(status).weak().size(11.0));

            if let Some(cell) = hovered.0 {
                let occupant = controller
                    .entity_at_cell(cell)
                    .and_then(|entity| controller.catalog().get(entity.type_index))
                    .map_or("empty", |prefab| prefab.name.as_str());
                ui.label(format!(
                    "Cell {cell}: {occupant}, speed {:+.1}",
                    controller.cell_speed_modifier(cell)
                ));
            }
            ui.label(format!("Placed: {}", controller.entity_count()));

            if !log.is_empty() {
                ui.separator();
                for entry in log.iter() {
                    ui.label(egui::RichText::new(entry).size(11.0));
                }
            }
        });

    let controller = &mut township.controller;
    if let Some(type_index) = start {
        let mut frame = scene.frame(controller);
        controller.start_placing(&mut frame, type_index);
    } else if let Some(mode) = switch {
        let mut frame = scene.frame(controller);
        controller.set_tool_active(&mut frame, mode);
    }
}
