//! Preview rotation.
//!
//! A single rotate key drives two modes:
//! - a short tap turns the preview by a coarse step,
//! - holding past the threshold switches to fine rotation, adding a small
//!   step every tick until release.
//!
//! After any fine adjustment the next tap first snaps back onto the coarse
//! grid, so fine tweaking never leaves later taps off-grid.

use glam::Quat;

use crate::config::PlacementConfig;
use crate::input::ButtonState;

/// Observable state of the rotate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    /// Key not held.
    Idle,
    /// Key held, still shorter than the hold threshold.
    HeldCoarsePending,
    /// Key held past the threshold, rotating continuously.
    HeldFine,
}

/// Tap/hold rotation state machine for one preview's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationController {
    angle: f32,
    coarse_step: f32,
    fine_step: f32,
    hold_threshold: f64,
    pressed_at: Option<f64>,
    fine_mode: bool,
    ever_used_fine: bool,
}

impl RotationController {
    /// Create a controller at angle 0.
    #[must_use]
    pub fn new(coarse_step: f32, fine_step: f32, hold_threshold: f64) -> Self {
        Self {
            angle: 0.0,
            coarse_step,
            fine_step,
            hold_threshold,
            pressed_at: None,
            fine_mode: false,
            ever_used_fine: false,
        }
    }

    /// Controller tuned for building previews.
    #[must_use]
    pub fn for_buildings(config: &PlacementConfig) -> Self {
        Self::new(
            config.building_coarse_step_degrees,
            config.fine_step_degrees,
            config.hold_threshold_secs,
        )
    }

    /// Controller tuned for path previews (quarter turns by default).
    #[must_use]
    pub fn for_paths(config: &PlacementConfig) -> Self {
        Self::new(
            config.path_coarse_step_degrees,
            config.fine_step_degrees,
            config.hold_threshold_secs,
        )
    }

    /// Start from a given angle instead of 0.
    #[must_use]
    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.angle = normalize_degrees(degrees);
        self
    }

    /// Current angle in degrees, within `[0, 360)`.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Coarse step in degrees.
    #[must_use]
    pub const fn coarse_step(&self) -> f32 {
        self.coarse_step
    }

    /// Whether fine rotation has been used at any point since the last reset.
    #[must_use]
    pub const fn ever_used_fine(&self) -> bool {
        self.ever_used_fine
    }

    /// Current key state.
    #[must_use]
    pub fn state(&self) -> RotationState {
        match (self.pressed_at, self.fine_mode) {
            (None, _) => RotationState::Idle,
            (Some(_), false) => RotationState::HeldCoarsePending,
            (Some(_), true) => RotationState::HeldFine,
        }
    }

    /// Back to angle 0 and idle, as for a freshly spawned preview.
    pub fn reset(&mut self) {
        *self = Self::new(self.coarse_step, self.fine_step, self.hold_threshold);
    }

    /// Rotate key went down.
    pub fn press(&mut self, now: f64) {
        self.pressed_at = Some(now);
        self.fine_mode = false;
    }

    /// Rotate key is still down this tick.
    pub fn hold(&mut self, now: f64) {
        let Some(pressed_at) = self.pressed_at else {
            return;
        };

        if !self.fine_mode && now - pressed_at >= self.hold_threshold {
            self.fine_mode = true;
            self.ever_used_fine = true;
            tracing::debug!("Rotation entered fine mode at {:.2} degrees", self.angle);
        }

        if self.fine_mode {
            self.angle = normalize_degrees(self.angle + self.fine_step);
        }
    }

    /// Rotate key went up.
    ///
    /// A press that never reached fine mode is a tap and applies one
    /// coarse step.
    pub fn release(&mut self, _now: f64) {
        if self.pressed_at.take().is_none() {
            return;
        }

        if !self.fine_mode {
            let base = if self.ever_used_fine {
                (self.angle / self.coarse_step).round() * self.coarse_step
            } else {
                self.angle
            };
            self.angle = normalize_degrees(base + self.coarse_step);
        }

        self.fine_mode = false;
    }

    /// Feed one tick of rotate-key state.
    pub fn update(&mut self, key: ButtonState, now: f64) {
        if key.just_pressed {
            self.press(now);
        } else if key.pressed {
            self.hold(now);
        }
        if key.just_released {
            self.release(now);
        }
    }

    /// World orientation: the authored orientation turned by the current
    /// angle about its own vertical axis.
    #[must_use]
    pub fn orientation(&self, base: Quat) -> Quat {
        base * Quat::from_rotation_y(self.angle.to_radians())
    }
}

/// Wrap degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
