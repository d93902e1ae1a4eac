//! Scripted per-tick input.
//!
//! [`InputScript`] owns the clock and the cursor and turns high level
//! gestures (click, tap, hold) into the tick sequence a real frame loop
//! would produce.

use glam::Vec2;
use township_core::controller::ToolController;
use township_core::input::{ButtonState, TickInput};

use crate::scene::FakeScene;

/// 60 ticks per second.
pub const DEFAULT_DT: f64 = 1.0 / 60.0;

/// Drives a controller tick by tick.
#[derive(Debug, Clone)]
pub struct InputScript {
    time: f64,
    dt: f64,
    cursor: Option<Vec2>,
    modifier: bool,
}

impl Default for InputScript {
    fn default() -> Self {
        Self::new()
    }
}

impl InputScript {
    /// Start at time 0 with no cursor.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dt(DEFAULT_DT)
    }

    /// Start at time 0 with a custom tick length.
    #[must_use]
    pub fn with_dt(dt: f64) -> Self {
        Self {
            time: 0.0,
            dt,
            cursor: None,
            modifier: false,
        }
    }

    /// Current time.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Move the cursor (takes effect on the next tick).
    pub fn move_cursor(&mut self, cursor: Vec2) -> &mut Self {
        self.cursor = Some(cursor);
        self
    }

    /// Move the cursor off the window.
    pub fn hide_cursor(&mut self) -> &mut Self {
        self.cursor = None;
        self
    }

    /// Hold or release the repeat modifier for following ticks.
    pub fn set_modifier(&mut self, held: bool) -> &mut Self {
        self.modifier = held;
        self
    }

    /// Run one tick, letting `edit` change the input first.
    pub fn tick_with(
        &mut self,
        controller: &mut ToolController,
        scene: &mut FakeScene,
        edit: impl FnOnce(&mut TickInput),
    ) -> &mut Self {
        let mut input = TickInput {
            time: self.time,
            cursor: self.cursor,
            modifier: self.modifier,
            ..TickInput::default()
        };
        edit(&mut input);

        scene.sync_picking(controller);
        controller.tick(scene, &input);
        self.time += self.dt;
        self
    }

    /// Quiet ticks.
    pub fn idle(
        &mut self,
        controller: &mut ToolController,
        scene: &mut FakeScene,
        ticks: usize,
    ) -> &mut Self {
        for _ in 0..ticks {
            self.tick_with(controller, scene, |_| {});
        }
        self
    }

    /// Move the cursor and run one quiet tick there.
    pub fn hover(
        &mut self,
        controller: &mut ToolController,
        scene: &mut FakeScene,
        cursor: Vec2,
    ) -> &mut Self {
        self.move_cursor(cursor);
        self.idle(controller, scene, 1)
    }

    /// Primary press on one tick, release on the next.
    pub fn click(&mut self, controller: &mut ToolController, scene: &mut FakeScene) -> &mut Self {
        self.tick_with(controller, scene, |input| input.primary = ButtonState::down());
        self.tick_with(controller, scene, |input| input.primary = ButtonState::up())
    }

    /// Move the cursor and click there.
    pub fn click_at(
        &mut self,
        controller: &mut ToolController,
        scene: &mut FakeScene,
        cursor: Vec2,
    ) -> &mut Self {
        self.move_cursor(cursor);
        self.click(controller, scene)
    }

    /// Primary held while the cursor walks through `cursors`, one
    /// position per tick, then released.
    pub fn drag_primary(
        &mut self,
        controller: &mut ToolController,
        scene: &mut FakeScene,
        cursors: &[Vec2],
    ) -> &mut Self {
        for (index, cursor) in cursors.iter().enumerate() {
            self.move_cursor(*cursor);
            let state = if index == 0 {
                ButtonState::down()
            } else {
                ButtonState::held()
            };
            self.tick_with(controller, scene, |input| input.primary = state);
        }
        self.tick_with(controller, scene, |input| input.primary = ButtonState::up())
    }

    /// Quick right-button press and release.
    pub fn right_click(
        &mut self,
        controller: &mut ToolController,
        scene: &mut FakeScene,
    ) -> &mut Self {
        self.tick_with(controller, scene, |input| input.secondary = ButtonState::down());
        self.tick_with(controller, scene, |input| input.secondary = ButtonState::up())
    }

    /// Right button held for `secs` (a camera drag, not a click).
    pub fn right_hold(
        &mut self,
        controller: &mut ToolController,
        scene: &mut FakeScene,
        secs: f64,
    ) -> &mut Self {
        self.tick_with(controller, scene, |input| input.secondary = ButtonState::down());
        let start = self.time;
        while self.time - start < secs {
            self.tick_with(controller, scene, |input| input.secondary = ButtonState::held());
        }
        self.tick_with(controller, scene, |input| input.secondary = ButtonState::up())
    }

    /// Quick rotate-key tap.
    pub fn tap_rotate(
        &mut self,
        controller: &mut ToolController,
        scene: &mut FakeScene,
    ) -> &mut Self {
        self.tick_with(controller, scene, |input| input.rotate = ButtonState::down());
        self.tick_with(controller, scene, |input| input.rotate = ButtonState::up())
    }

    /// Rotate key held for `secs`, then released.
    pub fn hold_rotate(
        &mut self,
        controller: &mut ToolController,
        scene: &mut FakeScene,
        secs: f64,
    ) -> &mut Self {
        self.tick_with(controller, scene, |input| input.rotate = ButtonState::down());
        let start = self.time;
        while self.time - start < secs {
            self.tick_with(controller, scene, |input| input.rotate = ButtonState::held());
        }
        self.tick_with(controller, scene, |input| input.rotate = ButtonState::up())
    }

    /// Escape.
    pub fn cancel(&mut self, controller: &mut ToolController, scene: &mut FakeScene) -> &mut Self {
        self.tick_with(controller, scene, |input| input.cancel = true)
    }
}
