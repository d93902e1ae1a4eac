//! Collaborators the core drives but does not implement.
//!
//! Rendering, cursor ray casting and entity picking belong to the host.
//! Tools reach them only through these traits, so the same tool code runs
//! under Bevy, under the headless loader and under test fakes.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Handle to a renderable instance owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

/// Appearance requested for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tint {
    /// Preview over free cells.
    Valid,
    /// Preview over occupied cells.
    Invalid,
    /// Hovered by the destroy tool.
    Highlight,
}

/// Projects a screen position onto the buildable ground surface.
pub trait GroundProjector {
    /// World point under `screen`, or `None` when the ray misses.
    fn project_to_ground(&self, screen: Vec2) -> Option<Vec3>;
}

/// Finds the placed entity under a screen position.
pub trait EntityPicker {
    /// Nearest placed entity under `screen`, if any.
    fn pick_entity(&self, screen: Vec2) -> Option<EntityId>;
}

/// Renderable instance management.
pub trait VisualDelegate {
    /// Create an instance of catalog entry `type_index`.
    ///
    /// `ghost` instances are drawn translucent until restored.
    fn spawn_instance(
        &mut self,
        type_index: usize,
        position: Vec3,
        rotation: Quat,
        ghost: bool,
    ) -> InstanceId;

    /// Move an instance.
    fn set_transform(&mut self, instance: InstanceId, position: Vec3, rotation: Quat);

    /// Apply a validity or highlight tint.
    fn set_tint(&mut self, instance: InstanceId, tint: Tint);

    /// Restore authored colours and full opacity.
    fn restore_appearance(&mut self, instance: InstanceId);

    /// Destroy an instance.
    fn despawn(&mut self, instance: InstanceId);
}

/// Everything a tool needs from the host in one bound.
pub trait Scene: GroundProjector + EntityPicker + VisualDelegate {}

impl<T: GroundProjector + EntityPicker + VisualDelegate> Scene for T {}

/// Scene with no cursor and no visuals.
///
/// Used when rebuilding the world from a save outside the game client:
/// instance ids are still handed out so entities look exactly as if they
/// had been placed interactively.
#[derive(Debug, Clone, Default)]
pub struct HeadlessScene {
    next_instance: u64,
    live: usize,
}

impl HeadlessScene {
    /// Create an empty headless scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instances spawned and not yet despawned.
    #[must_use]
    pub const fn live_instances(&self) -> usize {
        self.live
    }
}

impl GroundProjector for HeadlessScene {
    fn project_to_ground(&self, _screen: Vec2) -> Option<Vec3> {
        None
    }
}

impl EntityPicker for HeadlessScene {
    fn pick_entity(&self, _screen: Vec2) -> Option<EntityId> {
        None
    }
}

impl VisualDelegate for HeadlessScene {
    fn spawn_instance(
        &mut self,
        _type_index: usize,
        _position: Vec3,
        _rotation: Quat,
        _ghost: bool,
    ) -> InstanceId {
        self.next_instance += 1;
        self.live += 1;
        InstanceId(self.next_instance)
    }

    fn set_transform(&mut self, _instance: InstanceId, _position: Vec3, _rotation: Quat) {}

    fn set_tint(&mut self, _instance: InstanceId, _tint: Tint) {}

    fn restore_appearance(&mut self, _instance: InstanceId) {}

    fn despawn(&mut self, _instance: InstanceId) {
        self.live = self.live.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_scene_counts_live_instances() {
        let mut scene = HeadlessScene::new();
        let a = scene.spawn_instance(0, Vec3::ZERO, Quat::IDENTITY, false);
        let b = scene.spawn_instance(1, Vec3::ONE, Quat::IDENTITY, true);
        assert_ne!(a, b);
        assert_eq!(scene.live_instances(), 2);

        scene.despawn(a);
        assert_eq!(scene.live_instances(), 1);
        assert_eq!(scene.project_to_ground(Vec2::ZERO), None);
    }
}
