//! Per-tick input snapshot.
//!
//! The host samples its input devices once per frame and hands the core a
//! [`TickInput`]. Tools never see raw events; every tap/hold or click/drag
//! decision is made here from edge flags and timestamps.

use glam::Vec2;

/// Edge and level state of one button for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Button is down this tick.
    pub pressed: bool,
    /// Button went down this tick.
    pub just_pressed: bool,
    /// Button went up this tick.
    pub just_released: bool,
}

impl ButtonState {
    /// Not touched.
    pub const IDLE: Self = Self {
        pressed: false,
        just_pressed: false,
        just_released: false,
    };

    /// Went down this tick.
    #[must_use]
    pub const fn down() -> Self {
        Self {
            pressed: true,
            just_pressed: true,
            just_released: false,
        }
    }

    /// Still down from an earlier tick.
    #[must_use]
    pub const fn held() -> Self {
        Self {
            pressed: true,
            just_pressed: false,
            just_released: false,
        }
    }

    /// Went up this tick.
    #[must_use]
    pub const fn up() -> Self {
        Self {
            pressed: false,
            just_pressed: false,
            just_released: true,
        }
    }
}

/// Everything a tool may read during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Monotonic time in seconds.
    pub time: f64,
    /// Cursor in screen pixels, `None` when outside the window.
    pub cursor: Option<Vec2>,
    /// Confirm button (left mouse).
    pub primary: ButtonState,
    /// Cancel button (right mouse).
    pub secondary: ButtonState,
    /// Rotate key.
    pub rotate: ButtonState,
    /// Repeat/chain modifier held.
    pub modifier: bool,
    /// Cancel key (Escape) pressed this tick.
    pub cancel: bool,
}

impl TickInput {
    /// Quiet input at `time` with the cursor at `cursor`.
    #[must_use]
    pub fn at(time: f64, cursor: Vec2) -> Self {
        Self {
            time,
            cursor: Some(cursor),
            ..Default::default()
        }
    }
}

/// Tells a click of a button apart from a drag or long press.
///
/// A click is a release that comes within `max_duration` of the press and,
/// when both cursor positions are known, within `max_drag` pixels of it.
/// Anything else is assumed to belong to camera control.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickDetector {
    max_duration: f64,
    max_drag: f32,
    pressed: Option<(f64, Option<Vec2>)>,
}

impl ClickDetector {
    /// Create a detector with the given thresholds.
    #[must_use]
    pub fn new(max_duration: f64, max_drag: f32) -> Self {
        Self {
            max_duration,
            max_drag,
            pressed: None,
        }
    }

    /// Feed one tick. Returns `true` on the tick a click completes.
    pub fn update(&mut self, button: ButtonState, now: f64, cursor: Option<Vec2>) -> bool {
        if button.just_pressed {
            self.pressed = Some((now, cursor));
        }

        if !button.just_released {
            return false;
        }

        let Some((pressed_at, pressed_cursor)) = self.pressed.take() else {
            return false;
        };

        let quick = now - pressed_at <= self.max_duration;
        let still = match (pressed_cursor, cursor) {
            (Some(from), Some(to)) => from.distance(to) <= self.max_drag,
            _ => true,
        };

        quick && still
    }

    /// Forget any press in progress.
    pub fn reset(&mut self) {
        self.pressed = None;
    }
}
